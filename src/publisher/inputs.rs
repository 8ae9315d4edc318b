//! publisher::inputs
//!
//! Acquisition of the city and credential.
//!
//! The city comes from an explicit argument or `CITY_INPUT`; the credential
//! only ever comes from `GH_TOKEN`. Both are trimmed and must be non-empty.

use crate::core::types::{CityName, Credential};

use super::PublishError;

/// Environment variable holding the city.
pub const CITY_ENV: &str = "CITY_INPUT";

/// Environment variable holding the access token.
pub const TOKEN_ENV: &str = "GH_TOKEN";

/// Resolve the city from an explicit value, falling back to `CITY_INPUT`.
pub fn resolve_city(explicit: Option<&str>) -> Result<CityName, PublishError> {
    let from_env = std::env::var(CITY_ENV).ok();
    city_from(explicit, from_env.as_deref())
}

/// Read the access token from `GH_TOKEN`.
pub fn resolve_credential() -> Result<Credential, PublishError> {
    let from_env = std::env::var(TOKEN_ENV).ok();
    credential_from(from_env.as_deref())
}

fn city_from(explicit: Option<&str>, from_env: Option<&str>) -> Result<CityName, PublishError> {
    let present = |s: &&str| !s.trim().is_empty();
    let raw = explicit
        .filter(present)
        .or_else(|| from_env.filter(present))
        .ok_or_else(|| {
            PublishError::Configuration(format!(
                "no city given; pass --city or set {}",
                CITY_ENV
            ))
        })?;

    CityName::new(raw).map_err(|e| PublishError::Validation(e.to_string()))
}

fn credential_from(from_env: Option<&str>) -> Result<Credential, PublishError> {
    let raw = from_env
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PublishError::Configuration(format!("{} is not set", TOKEN_ENV)))?;

    Credential::new(raw).map_err(|e| PublishError::Configuration(e.to_string()))
}
