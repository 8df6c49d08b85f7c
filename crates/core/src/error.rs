/// Domain-level errors raised while normalizing inbound payloads.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The inbound body is not a usable JSON payload.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedPayload(err.to_string())
    }
}
