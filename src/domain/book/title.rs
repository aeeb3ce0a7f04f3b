use derive_more::Display;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Display)]
#[display(fmt = "{}", _0)]
pub struct Title(String);

impl TryFrom<String> for Title {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err("title is empty".into());
        }

        if value.graphemes(true).count() > 256 {
            return Err("title is too long".into());
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
