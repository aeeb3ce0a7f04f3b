mod authorization_header;

/// Add this as a parameter to a handler function to require the user to be logged in.
///
/// Parses a session token from the `Authorization: Bearer <token>` header.
#[derive(Debug)]
pub struct AuthUser {
    pub username: String,
}
