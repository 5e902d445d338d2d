use std::sync::Arc;

use async_trait::async_trait;
use crates::domain::{
    interfaces::identity::IdentityResolver,
    repositories::accounts::AccountRepository,
    value_objects::iam::{AccountModel, AuthenticatedUser, Credentials},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub aud: String,
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn validate_access_token(
    token: &str,
    secret: &str,
    audience: &str,
) -> Result<AccessClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_audience(&[audience]);

    let token_data = decode::<AccessClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Resolves bearer session tokens to accounts.
pub struct JwtIdentityResolver {
    secret: String,
    audience: String,
    accounts: Arc<dyn AccountRepository>,
}

impl JwtIdentityResolver {
    pub fn new(secret: String, audience: String, accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            secret,
            audience,
            accounts,
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, credentials: &Credentials) -> anyhow::Result<Option<AuthenticatedUser>> {
        let Some(token) = credentials.bearer_token.as_deref() else {
            return Ok(None);
        };

        let claims = match validate_access_token(token, &self.secret, &self.audience) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "auth: token rejected");
                return Ok(None);
            }
        };

        let Some(account) = self.accounts.find_by_uid(&claims.sub).await? else {
            info!(uid = %claims.sub, "auth: token for unknown account");
            return Ok(None);
        };

        let account = AccountModel::from(account);
        Ok(Some(AuthenticatedUser {
            uid: account.uid.clone(),
            email: account.email.clone(),
            account,
        }))
    }
}
