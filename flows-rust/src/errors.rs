use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// The flow input failed validation before any network call was made.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The model output did not conform to the flow's output schema.
    /// Not retried: an ill-formed response is unlikely to improve without
    /// prompt changes.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// The backend rejected the request for quota/throughput reasons.
    /// `retry_after` carries the backend's "retry in N s" hint when the
    /// error body included one.
    #[error("Rate limited (status {status}): {message}")]
    RateLimited {
        status: u16,
        retry_after: Option<f64>,
        message: String,
    },
    /// The request to the backend failed in transit or the response body
    /// could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Any other backend failure. Always fatal, propagated immediately.
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type FlowResult<T> = Result<T, FlowError>;

/// Extract a "retry in N s" hint from a backend error body, e.g.
/// "Resource exhausted. Please retry in 27.5s.".
#[must_use]
pub fn parse_retry_hint(message: &str) -> Option<f64> {
    let rest = &message[message.find("retry in ")? + "retry in ".len()..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_retry_hint;

    #[test]
    fn parses_fractional_hint() {
        let msg = "429 Too Many Requests. Please retry in 27.5s.";
        assert_eq!(parse_retry_hint(msg), Some(27.5));
    }

    #[test]
    fn parses_integer_hint() {
        assert_eq!(parse_retry_hint("quota exceeded, retry in 4s"), Some(4.0));
    }

    #[test]
    fn absent_hint_yields_none() {
        assert_eq!(parse_retry_hint("quota exceeded"), None);
        assert_eq!(parse_retry_hint("retry in soon"), None);
    }
}
