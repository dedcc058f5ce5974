//! Per-file identity handed to every task.

/// Immutable identity of the file being checked.
///
/// `path` is relative to the scan root and always uses `/` separators so
/// diagnostics look the same on every platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    path: String,
    extension: String,
}

impl FileContext {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let name = path.rsplit('/').next().unwrap_or_default();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        Self { path, extension }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// True when the file's extension is one of `extensions`.
    pub fn is(&self, extensions: &[&str]) -> bool {
        extensions.iter().any(|e| *e == self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(FileContext::new("src/a.php").extension(), "php");
        assert_eq!(FileContext::new("lib/x.tar.gz").extension(), "gz");
        assert_eq!(FileContext::new("Makefile").extension(), "");
        assert_eq!(FileContext::new("www/.htaccess").extension(), "htaccess");
    }

    #[test]
    fn test_path_uses_forward_slashes() {
        let f = FileContext::new("app\\Model\\User.php");
        assert_eq!(f.path(), "app/Model/User.php");
        assert!(f.is(&["php", "phpt"]));
        assert!(!f.is(&["latte"]));
    }
}
