pub mod password;
pub mod username;

use self::password::Password;
use self::username::Username;

pub struct NewUser {
    pub username: Username,
    pub password: Password,
}
