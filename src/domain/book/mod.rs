pub mod author;
pub mod title;

use self::author::Author;
use self::title::Title;

/// A validated book, ready to be stored.
pub struct NewBook {
    pub title: Title,
    pub author: Author,
    pub description: Option<String>,
}
