use secrecy::Secret;

/// A password as typed by the user. Never logged, only ever hashed.
pub struct Password(Secret<String>);

impl TryFrom<String> for Password {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("password is empty".into());
        }

        // Bounds the work a single argon2 call can be asked to do.
        if value.len() > 1024 {
            return Err("password is too long".into());
        }

        Ok(Self(Secret::new(value)))
    }
}

impl Password {
    pub fn into_secret(self) -> Secret<String> {
        self.0
    }
}
