use derive_more::Display;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Display)]
#[display(fmt = "{}", _0)]
pub struct Author(String);

impl TryFrom<String> for Author {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err("author is empty".into());
        }

        if value.graphemes(true).count() > 256 {
            return Err("author is too long".into());
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for Author {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
