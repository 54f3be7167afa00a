use thiserror::Error;

/// Non-success HTTP response from a provider.
///
/// Returned wrapped in `anyhow::Error`; callers that care about the status
/// can `downcast_ref::<ApiError>()`.
#[derive(Error, Debug, Clone)]
#[error("{provider} API error ({status}): {body}")]
pub struct ApiError {
    pub provider: &'static str,
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_provider_and_status() {
        let err = ApiError {
            provider: "Gemini",
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Gemini API error (503): overloaded");
    }

    #[test]
    fn downcasts_through_anyhow() {
        let err: anyhow::Error = ApiError {
            provider: "Claude",
            status: 429,
            body: String::new(),
        }
        .into();
        let api = err.downcast_ref::<ApiError>().expect("should downcast");
        assert_eq!(api.status, 429);
    }
}
