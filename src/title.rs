//! The validated title shared by sheets and financial goals.

use std::fmt::Display;

use crate::Error;

/// A trimmed, non-empty title.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Create a title from user input.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTitle] if `title` is empty or only whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyTitle)
        } else {
            Ok(Self(title.to_owned()))
        }
    }

    /// Create a title without validation.
    ///
    /// The caller should ensure that the string is not empty, e.g. because it was read back from the database.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_owned())
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Treat blank optional text fields as missing.
pub fn optional_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{Title, optional_text};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(Title::new(""), Err(Error::EmptyTitle));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(Title::new("\n\t \r"), Err(Error::EmptyTitle));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        assert_eq!(Title::new("  Januari 2025 ").unwrap().as_ref(), "Januari 2025");
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" rent ")), Some("rent".to_owned()));
    }
}
