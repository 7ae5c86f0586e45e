/// Result alias that carries the custom [`VisError`] type.
pub type Result<T> = std::result::Result<T, VisError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VisError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Input data does not have the shape a chart expects.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// A string could not be parsed into one of the configuration enums.
    #[error("unsupported {kind} `{value}` (expected one of: {expected})")]
    Unsupported {
        kind: &'static str,
        value: String,
        expected: String,
    },
    /// A table lookup referenced a column that does not exist.
    #[error("unknown column `{0}`")]
    MissingColumn(String),
    /// A configuration update was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Toml(#[from] toml::de::Error),
}

impl VisError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Shorthand for [`VisError::InvalidData`].
    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidData(msg.into())
    }
}

impl From<&str> for VisError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for VisError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_lists_expected_values() {
        let err = VisError::Unsupported {
            kind: "theme",
            value: "neon".to_string(),
            expected: "light, dark".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported theme `neon` (expected one of: light, dark)"
        );
    }

    #[test]
    fn converts_plain_strings() {
        let err: VisError = "boom".into();
        assert!(matches!(err, VisError::Message(ref m) if m == "boom"));
    }
}
