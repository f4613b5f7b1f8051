use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteService(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteService(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        assert!(DomainError::configuration("missing OPENAI_API_KEY").is_configuration());
        assert!(!DomainError::remote("503").is_configuration());
        assert!(DomainError::remote("timeout").is_remote());
        assert!(DomainError::parse("bad json").is_parse());
        assert!(DomainError::validation("empty").is_validation());
    }

    #[test]
    fn test_error_display_carries_message() {
        let err = DomainError::configuration("missing OPENAI_API_KEY");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing OPENAI_API_KEY"
        );
    }
}
