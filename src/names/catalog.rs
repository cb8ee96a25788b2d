//! Closed, ordered list of canonical creature names

use crate::error::{CaptchaError, CaptchaResult};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameCatalog {
    names: Vec<String>,
}

impl NameCatalog {
    /// Build from names in priority order; case-insensitive duplicates keep the first
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || catalog.contains(name) {
                continue;
            }
            catalog.names.push(name.to_string());
        }
        catalog
    }

    /// Load one name per line; blank lines and `#` comments are skipped
    pub fn from_file(path: impl AsRef<Path>) -> CaptchaResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CaptchaError::asset_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&content);
        log::info!("📚 Loaded {} catalog names from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_comments_and_duplicates() {
        let catalog = NameCatalog::parse("# generation one\nBulbasaur\n\n  Ivysaur  \nbulbasaur\n");
        let names: Vec<&str> = catalog.iter().collect();
        assert_eq!(names, vec!["Bulbasaur", "Ivysaur"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Pikachu\nRaichu").unwrap();
        let catalog = NameCatalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("PIKACHU"));
    }

    #[test]
    fn test_missing_file_is_asset_not_found() {
        let err = NameCatalog::from_file("/nonexistent/catalog.txt").unwrap_err();
        assert!(matches!(err, CaptchaError::AssetNotFound { .. }));
    }
}
