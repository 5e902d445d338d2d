use crates::domain::{
    entities::customers::{CustomerEntity, CustomerExpand},
    value_objects::{
        customs::CustomsVerdict,
        iam::{AuthenticatedUser, RequestContext},
    },
};
use tracing::{error, info, warn};

use super::{
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

pub async fn authenticate(
    services: &BillingServices,
    request: &RequestContext,
) -> UseCaseResult<AuthenticatedUser> {
    services
        .identity
        .resolve(&request.credentials)
        .await
        .map_err(|err| {
            error!(error = ?err, "auth: identity lookup failed");
            SubscriptionError::Upstream(err)
        })?
        .ok_or_else(|| {
            info!("auth: request without valid credentials");
            SubscriptionError::Unauthorized
        })
}

/// Resolves the caller and runs the abuse check for `action`.
pub async fn authorize(
    services: &BillingServices,
    request: &RequestContext,
    action: &str,
) -> UseCaseResult<AuthenticatedUser> {
    let user = authenticate(services, request).await?;

    let verdict = services
        .customs
        .check(&request.client_address, &user.email, action)
        .await
        .map_err(|err| {
            error!(uid = %user.uid, error = ?err, action, "customs: check failed");
            SubscriptionError::Upstream(err)
        })?;

    if let CustomsVerdict::Blocked { retry_after_secs } = verdict {
        warn!(uid = %user.uid, action, ?retry_after_secs, "customs: request blocked");
        return Err(SubscriptionError::RequestBlocked { retry_after_secs });
    }

    Ok(user)
}

pub async fn fetch_customer(
    services: &BillingServices,
    uid: &str,
    expand: Vec<CustomerExpand>,
) -> UseCaseResult<Option<CustomerEntity>> {
    services
        .customers
        .fetch_customer(uid, expand)
        .await
        .map_err(|err| {
            error!(%uid, error = ?err, "customers: failed to fetch customer");
            SubscriptionError::Upstream(err)
        })
}

/// Like [`fetch_customer`] but a missing customer is an error.
pub async fn require_customer(
    services: &BillingServices,
    uid: &str,
    expand: Vec<CustomerExpand>,
) -> UseCaseResult<CustomerEntity> {
    fetch_customer(services, uid, expand)
        .await?
        .ok_or_else(|| SubscriptionError::UnknownCustomer {
            uid: uid.to_string(),
        })
}

/// The provider customer id stored for the account, without a provider round trip.
pub async fn stored_customer_id(services: &BillingServices, uid: &str) -> UseCaseResult<String> {
    let record = services
        .account_customers
        .find_by_uid(uid)
        .await
        .map_err(|err| {
            error!(%uid, db_error = ?err, "customers: failed to load account customer");
            SubscriptionError::Upstream(err)
        })?;

    record
        .and_then(|record| record.stripe_customer_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SubscriptionError::UnknownCustomer {
            uid: uid.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::usecases::test_support::{Mocks, request, stub_user};

    #[tokio::test]
    async fn missing_credentials_are_unauthorized() {
        let mut mocks = Mocks::new();
        mocks.identity.expect_resolve().returning(|_| Ok(None));
        mocks.customs.expect_check().never();
        let services = mocks.into_services();

        let result = authorize(&services, &request(), "getCheckoutToken").await;

        assert!(matches!(result, Err(SubscriptionError::Unauthorized)));
    }

    #[tokio::test]
    async fn blocked_requests_surface_retry_after() {
        let mut mocks = Mocks::new();
        mocks
            .identity
            .expect_resolve()
            .returning(|_| Ok(Some(stub_user())));
        mocks
            .customs
            .expect_check()
            .with(eq("203.0.113.9"), eq("user@example.com"), eq("retryInvoice"))
            .returning(|_, _, _| {
                Ok(CustomsVerdict::Blocked {
                    retry_after_secs: Some(60),
                })
            });
        let services = mocks.into_services();

        let result = authorize(&services, &request(), "retryInvoice").await;

        assert!(matches!(
            result,
            Err(SubscriptionError::RequestBlocked {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn empty_stored_customer_id_is_unknown() {
        use crates::domain::entities::account_customers::AccountCustomerEntity;

        let mut mocks = Mocks::new();
        mocks
            .account_customers
            .expect_find_by_uid()
            .with(eq("uid-1"))
            .returning(|uid| {
                Ok(Some(AccountCustomerEntity {
                    uid: uid.to_string(),
                    stripe_customer_id: Some(String::new()),
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                }))
            });
        let services = mocks.into_services();

        let result = stored_customer_id(&services, "uid-1").await;

        assert!(matches!(result, Err(SubscriptionError::UnknownCustomer { .. })));
    }
}
