use derive_more::Display;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Display)]
#[display(fmt = "{}", _0)]
pub struct Username(String);

impl TryFrom<String> for Username {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("username is empty".into());
        }

        if value.graphemes(true).count() > 64 {
            return Err("username is too long".into());
        }

        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err("username contains whitespace or control characters".into());
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
