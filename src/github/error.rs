use std::time::Duration;

/// Failure of a single transport attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Connection-level failure (DNS, TLS, reset, refused)
    Connection(String),
    /// The request did not finish in time
    Timeout(Duration),
    /// The server answered with a non-success status
    Status { status: u16, message: String },
    /// The response body could not be decoded
    Malformed(String),
}

impl TransportError {
    /// Convert octocrab error to a transport failure
    pub fn from_octocrab_error(error: octocrab::Error) -> Self {
        tracing::debug!("Raw octocrab error: {:?}", error);

        match &error {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                if status == 403 && source.message.to_lowercase().contains("rate limit") {
                    tracing::warn!("Rate limit (403) detected: {}", source.message);
                }
                Self::Status {
                    status,
                    message: source.message.clone(),
                }
            }
            octocrab::Error::Http { .. } | octocrab::Error::Hyper { .. } => {
                Self::Connection(format!("HTTP layer error: {}", error))
            }
            octocrab::Error::Json { .. } => {
                Self::Malformed(format!("JSON parsing error: {}", error))
            }
            _ => Self::Connection(format!("octocrab error: {}", error)),
        }
    }

    /// Convert reqwest error to a transport failure
    pub fn from_reqwest_error(error: reqwest::Error, timeout: Duration) -> Self {
        tracing::debug!("Raw reqwest error: {:?}", error);

        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_decode() {
            Self::Malformed(format!("body decode error: {}", error))
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            Self::Connection(format!("HTTP error: {}", error))
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::Timeout(duration) => write!(f, "Request timed out after {:?}", duration),
            Self::Status { status, message } => {
                write!(f, "Unexpected status {}: {}", status, message)
            }
            Self::Malformed(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}
