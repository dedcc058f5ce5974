//! Decoders for formats with an established serde parser.

use super::{line_at, ConfigDecoder, DecodeError};

#[derive(Debug, Default, Clone, Copy)]
pub struct Json;

#[derive(Debug, Default, Clone, Copy)]
pub struct Yaml;

#[derive(Debug, Default, Clone, Copy)]
pub struct Toml;

/// Drop the " at line X column Y" tail; the line is reported separately.
fn strip_location(message: String) -> String {
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    }
}

impl ConfigDecoder for Json {
    fn decode(&self, source: &str) -> Result<(), DecodeError> {
        serde_json::from_str::<serde_json::Value>(source)
            .map(|_| ())
            .map_err(|e| {
                let line = (e.line() > 0).then_some(e.line());
                DecodeError::new(strip_location(e.to_string()), line)
            })
    }
}

impl ConfigDecoder for Yaml {
    fn decode(&self, source: &str) -> Result<(), DecodeError> {
        serde_yaml::from_str::<serde_yaml::Value>(source)
            .map(|_| ())
            .map_err(|e| {
                let line = e.location().map(|l| l.line());
                DecodeError::new(strip_location(e.to_string()), line)
            })
    }
}

impl ConfigDecoder for Toml {
    fn decode(&self, source: &str) -> Result<(), DecodeError> {
        toml::from_str::<toml::Table>(source)
            .map(|_| ())
            .map_err(|e| {
                let line = e.span().map(|span| line_at(source, span.start));
                DecodeError::new(e.message().trim_end().to_string(), line)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json() {
        assert!(Json.decode("{\"a\": [1, 2]}").is_ok());
        let err = Json.decode("{\n\"a\": [1, 2\n}").unwrap_err();
        assert_eq!(err.line, Some(3));
        assert!(!err.message.contains(" at line "));
    }

    #[test]
    fn test_yaml() {
        assert!(Yaml.decode("a:\n  - 1\n  - 2\n").is_ok());
        let err = Yaml.decode("a: 1\nb: [1, 2\n").unwrap_err();
        assert!(err.line.is_some());
    }

    #[test]
    fn test_toml() {
        assert!(Toml.decode("[server]\nport = 80\n").is_ok());
        let err = Toml.decode("a = 1\nb = \n").unwrap_err();
        assert_eq!(err.line, Some(2));
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_strip_location() {
        assert_eq!(
            strip_location("expected value at line 3 column 1".into()),
            "expected value"
        );
        assert_eq!(strip_location("plain".into()), "plain");
    }
}
