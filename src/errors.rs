use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Internal tree operation failed: {0}")]
    Internal(String),
}

impl TreeError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, TreeError::InvalidArgument(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, TreeError::IllegalState(_))
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TreeError::InvalidArgument("length is not a power of two".into());
        assert_eq!(err.to_string(), "Invalid argument: length is not a power of two");
        assert!(err.is_invalid_argument());
        assert!(!err.is_illegal_state());

        let err = TreeError::IllegalState("leaf value is not set".into());
        assert!(err.is_illegal_state());
    }
}
