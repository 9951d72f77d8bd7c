use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_use_their_wire_names() {
        let error = ApiError::not_found("unknown dashboard 'weather'");
        assert_eq!(
            serde_json::to_string(&error).expect("json"),
            r#"{"code":"not_found","message":"unknown dashboard 'weather'"}"#
        );
        let code: ErrorCode = serde_json::from_str(r#""validation""#).expect("code");
        assert_eq!(code, ErrorCode::Validation);
        assert!(serde_json::from_str::<ErrorCode>(r#""internal""#).is_err());
    }
}
