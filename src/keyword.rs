/// A case-insensitive substring needle.
///
/// Stored lowercased once so each test only lowercases the candidate name.
/// An empty keyword matches every name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyword {
    needle: String,
}

impl Keyword {
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            needle: pattern.as_ref().to_lowercase(),
        }
    }

    /// The lowercased needle.
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Returns `true` if `name` contains the keyword, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.needle.is_empty() || name.to_lowercase().contains(&self.needle)
    }
}

impl From<&str> for Keyword {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Keyword {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ignoring_case() {
        let kw = Keyword::new("FoO");
        assert!(kw.matches("foobar.txt"));
        assert!(kw.matches("My_FOO_dir"));
        assert!(!kw.matches("bar.txt"));
    }

    #[test]
    fn empty_matches_everything() {
        let kw = Keyword::new("");
        assert!(kw.is_empty());
        assert!(kw.matches(""));
        assert!(kw.matches("anything"));
    }

    #[test]
    fn needle_longer_than_name_never_matches() {
        assert!(!Keyword::new("longer").matches("long"));
    }

    #[test]
    fn non_ascii_names() {
        let kw = Keyword::new("ÄPFEL");
        assert!(kw.matches("äpfel_und_birnen"));
        assert_eq!(kw.as_str(), "äpfel");
    }
}
