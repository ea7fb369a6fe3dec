use thiserror::Error;

/// Failures surfaced by the core. Remote failures are always caught at the
/// component boundary and turned into one of these; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Rejected locally, no request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{detail}")]
    Remote { status: Option<u16>, detail: String },

    /// Missing or expired token. Re-authentication is the caller's job.
    #[error("not authenticated: {0}")]
    Auth(String),

    #[error("{0} already in progress")]
    Busy(&'static str),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn remote(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Remote {
            status,
            detail: detail.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::remote(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_detail_only() {
        let err = CoreError::remote(Some(400), "Unknown food: kale");
        assert_eq!(err.to_string(), "Unknown food: kale");
        assert!(err.is_remote());
    }

    #[test]
    fn busy_names_the_request_kind() {
        assert_eq!(
            CoreError::Busy("meal submission").to_string(),
            "meal submission already in progress"
        );
    }
}
