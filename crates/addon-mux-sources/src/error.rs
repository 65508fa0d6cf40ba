use thiserror::Error;

/// Failures of the registration data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access registrations for user '{user_id}': {source}")]
    Io {
        user_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registrations for user '{user_id}' are corrupted: {source}")]
    Corrupted {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode registrations for user '{user_id}': {source}")]
    Encode {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid user id '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidUserId(String),
}

/// Failures talking to an upstream addon
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned malformed JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} response has no metas array")]
    MissingMetas { url: String },
}
