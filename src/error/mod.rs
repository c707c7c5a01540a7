//! Centralized error handling for otelib
pub mod ote;

pub use ote::{OteError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = OteError::creation("filter", "missing 'filterType'");
        assert!(matches!(err, OteError::Creation { .. }));
        assert_eq!(err.to_string(), "Cannot create filter: missing 'filterType'");
    }

    #[test]
    fn test_error_transport_keeps_status() {
        let err = OteError::transport(Some(502), "Cannot fetch filter");
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "Transport error: status=502 Cannot fetch filter");

        let err = OteError::transport(None, "connection refused");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_error_dispatch_messages() {
        let err = OteError::InvalidBackend("grpc".to_string());
        assert_eq!(err.to_string(), "\"grpc\" is not a valid backend");

        let err = OteError::NotImplemented {
            kind: "function".to_string(),
            backend: "python".to_string(),
        };
        assert!(err.to_string().contains("not supported by the \"python\" backend"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: OteError = json_err.into();
        assert!(matches!(err, OteError::Serialization(_)));
    }
}
