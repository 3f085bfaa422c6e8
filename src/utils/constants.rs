//! Shared constants and invariants

/// Seconds subtracted from a token's lifetime before it is considered expired.
pub const DEFAULT_BUFFER_SECONDS: u64 = 180;
/// Assumed lifetime when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECONDS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_SCOPE: &str = "api://AzureADTokenExchange/.default";
pub const CLIENT_ASSERTION_TYPE_JWT_BEARER: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

// Grant types
pub const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";
pub const GRANT_USER_FIC: &str = "user_fic";
pub const TOKEN_USE_ON_BEHALF_OF: &str = "on_behalf_of";

pub const DEFAULT_CONFIG_PATH: &str = "fic-token-chain.yaml";
