use serde::{Deserialize, Serialize};

use crate::domain::entities::accounts::AccountEntity;

/// Bearer credentials exactly as presented by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub bearer_token: Option<String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub state: Option<String>,
    pub state_code: Option<String>,
    pub postal_code: Option<String>,
}

/// Per-request facts every use case receives.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestContext {
    pub credentials: Credentials,
    pub client_address: String,
    pub location: Option<GeoLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub account: AccountModel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountModel {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    pub verifier_set_at: i64,
}

impl AccountModel {
    /// Stub accounts were created during checkout and never got a password.
    pub fn is_stub(&self) -> bool {
        self.verifier_set_at <= 0
    }
}

impl From<AccountEntity> for AccountModel {
    fn from(entity: AccountEntity) -> Self {
        Self {
            uid: entity.uid,
            email: entity.email,
            email_verified: entity.email_verified,
            verifier_set_at: entity.verifier_set_at,
        }
    }
}
