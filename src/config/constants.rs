//! Constants for otelib

/// Application route prefix of the OTE service
pub const DEFAULT_PREFIX: &str = "/api/v1";

/// Connect timeout for OTE service requests, in seconds
pub const DEFAULT_CONNECT_TIMEOUT: f64 = 3.0;

/// Read timeout for OTE service requests, in seconds
pub const DEFAULT_READ_TIMEOUT: f64 = 27.0;

/// Prefix of session ids minted by the local backend
pub const SESSION_ID_PREFIX: &str = "session-";

/// Environment variable overriding the route prefix
pub const ENV_PREFIX: &str = "OTEAPI_PREFIX";

/// Environment variable overriding the timeouts, as `"connect,read"`
pub const ENV_TIMEOUT: &str = "OTEAPI_TIMEOUT";

/// Environment variable enabling debug mode when non-empty
pub const ENV_DEBUG: &str = "OTELIB_DEBUG";

/// Source names selecting the local backend
pub const LOCAL_SOURCES: &[&str] = &["python", "local"];

/// Key under which data resources and parsers store their decoded payload
pub const CONTENT_KEY: &str = "content";
