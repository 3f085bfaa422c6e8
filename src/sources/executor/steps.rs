//! Request parameters of the three exchange steps.
//!
//! Each builder takes what the previous steps produced, so a refreshed
//! upstream token changes every downstream cache key.

use crate::cache::cache_key::TokenRequestParams;
use crate::config::credentials::ChainCredentials;
use crate::utils::constants::{
    CLIENT_ASSERTION_TYPE_JWT_BEARER, DEFAULT_SCOPE, GRANT_CLIENT_CREDENTIALS, GRANT_USER_FIC,
    TOKEN_USE_ON_BEHALF_OF,
};

/// Step 1: the blueprint app trades its secret for a FIC scoped to the agent.
pub fn blueprint_params(credentials: &ChainCredentials) -> TokenRequestParams {
    TokenRequestParams::new()
        .with("grant_type", GRANT_CLIENT_CREDENTIALS)
        .with("client_id", credentials.blueprint_id.as_str())
        .with("client_secret", credentials.blueprint_secret.as_str())
        .with("scope", DEFAULT_SCOPE)
        .with("fmi_path", credentials.agent_id.as_str())
}

/// Step 2: the agent identity presents the blueprint FIC as its client assertion.
pub fn agent_fic_params(credentials: &ChainCredentials, blueprint_token: &str) -> TokenRequestParams {
    TokenRequestParams::new()
        .with("grant_type", GRANT_CLIENT_CREDENTIALS)
        .with("client_id", credentials.agent_id.as_str())
        .with("scope", DEFAULT_SCOPE)
        .with("client_assertion", blueprint_token)
        .with("client_assertion_type", CLIENT_ASSERTION_TYPE_JWT_BEARER)
}

/// Step 3: on-behalf-of exchange for the agent user.
pub fn user_token_params(
    credentials: &ChainCredentials,
    blueprint_token: &str,
    agent_fic_token: &str,
) -> TokenRequestParams {
    TokenRequestParams::new()
        .with("grant_type", GRANT_USER_FIC)
        .with("requested_token_use", TOKEN_USE_ON_BEHALF_OF)
        .with("client_id", credentials.agent_id.as_str())
        .with("client_assertion", blueprint_token)
        .with("client_assertion_type", CLIENT_ASSERTION_TYPE_JWT_BEARER)
        .with("username", credentials.agent_user.as_str())
        .with("user_federated_identity_credential", agent_fic_token)
        .with("scope", credentials.scope.as_str())
}
