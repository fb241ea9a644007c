use strum_macros::AsRefStr;
use thiserror::Error;

/// Failures raised while issuing or verifying signed tokens.
/// The variant name is what gets logged; clients only ever see a 401.
#[derive(Error, Debug, Clone, PartialEq, AsRefStr)]
pub enum TokenError {
    #[error("authorization header missing token")]
    HeaderMissing,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("signature is invalid")]
    SignatureInvalid,

    #[error("token is expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Creation(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(error.to_string()),
        }
    }
}
