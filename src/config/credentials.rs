use std::fmt;

use serde::Deserialize;

use crate::errors::ChainError;
use crate::utils::constants::DEFAULT_SCOPE;

/// ================================
/// Credentials as supplied by the host
/// ================================
///
/// Every field is optional at the serde level so that missing values surface
/// as one `ChainError::Configuration` listing all of them, before any request.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    pub token_endpoint: Option<String>,
    pub blueprint_id: Option<String>,
    pub blueprint_secret: Option<String>,
    pub agent_id: Option<String>,
    pub agent_user: Option<String>,
    pub scope: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token_endpoint", &self.token_endpoint)
            .field("blueprint_id", &self.blueprint_id)
            .field("blueprint_secret", &self.blueprint_secret.as_ref().map(|_| "***"))
            .field("agent_id", &self.agent_id)
            .field("agent_user", &self.agent_user)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Credentials with every required field present and the scope resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct ChainCredentials {
    pub token_endpoint: String,
    pub blueprint_id: String,
    pub blueprint_secret: String,
    pub agent_id: String,
    pub agent_user: String,
    pub scope: String,
}

impl fmt::Debug for ChainCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCredentials")
            .field("token_endpoint", &self.token_endpoint)
            .field("blueprint_id", &self.blueprint_id)
            .field("blueprint_secret", &"***")
            .field("agent_id", &self.agent_id)
            .field("agent_user", &self.agent_user)
            .field("scope", &self.scope)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        token_endpoint: impl Into<String>,
        blueprint_id: impl Into<String>,
        blueprint_secret: impl Into<String>,
        agent_id: impl Into<String>,
        agent_user: impl Into<String>,
    ) -> Self {
        Self {
            token_endpoint: Some(token_endpoint.into()),
            blueprint_id: Some(blueprint_id.into()),
            blueprint_secret: Some(blueprint_secret.into()),
            agent_id: Some(agent_id.into()),
            agent_user: Some(agent_user.into()),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("token_endpoint", &self.token_endpoint),
            ("blueprint_id", &self.blueprint_id),
            ("blueprint_secret", &self.blueprint_secret),
            ("agent_id", &self.agent_id),
            ("agent_user", &self.agent_user),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self) -> Result<ChainCredentials, ChainError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ChainError::Configuration(format!(
                "missing required credential field(s): {}",
                missing.join(", ")
            )));
        }

        let required = |value: &Option<String>| present(value).unwrap_or_default().to_owned();
        Ok(ChainCredentials {
            token_endpoint: required(&self.token_endpoint),
            blueprint_id: required(&self.blueprint_id),
            blueprint_secret: required(&self.blueprint_secret),
            agent_id: required(&self.agent_id),
            agent_user: required(&self.agent_user),
            scope: present(&self.scope).unwrap_or(DEFAULT_SCOPE).to_owned(),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
