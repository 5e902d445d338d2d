use crates::domain::{
    entities::customers::CustomerExpand,
    value_objects::{
        accounts::{AccountCleanupError, AccountDeletionOutcome},
        iam::AuthenticatedUser,
    },
};
use tracing::{error, info};

use super::{
    errors::{SubscriptionError, UseCaseResult},
    services::BillingServices,
};

/// Deletes the account behind `email` unless someone has verified it.
pub async fn delete_account_if_unverified(
    services: &BillingServices,
    email: &str,
) -> Result<AccountDeletionOutcome, AccountCleanupError> {
    let Some(record) = services.accounts.find_email_record(email).await? else {
        return Ok(AccountDeletionOutcome::NotFound);
    };

    if !record.is_primary {
        if record.is_verified {
            return Err(AccountCleanupError::VerifiedSecondaryEmailExists(
                email.to_string(),
            ));
        }
        services.accounts.delete_email(&record.uid, email).await?;
        return Ok(AccountDeletionOutcome::Deleted);
    }

    if record.is_verified {
        return Err(AccountCleanupError::AccountExists(email.to_string()));
    }

    // billing history keeps the account even without a verified login
    let customer = services
        .customers
        .fetch_customer(&record.uid, vec![CustomerExpand::Subscriptions])
        .await?;
    if customer.is_some_and(|customer| !customer.subscriptions.is_empty()) {
        return Ok(AccountDeletionOutcome::Kept);
    }

    services.accounts.delete_account(&record.uid).await?;
    Ok(AccountDeletionOutcome::Deleted)
}

/// Passes `result` through, deleting the caller's stub account first when it failed.
///
/// A benign cleanup refusal keeps the original error; any other cleanup failure replaces it.
pub async fn finish_with_stub_cleanup<T>(
    services: &BillingServices,
    user: &AuthenticatedUser,
    result: UseCaseResult<T>,
) -> UseCaseResult<T> {
    let err = match result {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    if !user.account.is_stub() {
        return Err(err);
    }

    match delete_account_if_unverified(services, &user.email).await {
        Ok(outcome) => {
            info!(uid = %user.uid, ?outcome, "account cleanup: stub account handled after failure");
            Err(err)
        }
        Err(cleanup) if cleanup.is_benign() => {
            info!(uid = %user.uid, reason = %cleanup, "account cleanup: account kept");
            Err(err)
        }
        Err(cleanup) => {
            error!(
                uid = %user.uid,
                error = ?cleanup,
                original_error = %err,
                "account cleanup: stub account deletion failed"
            );
            Err(SubscriptionError::AccountCleanup(cleanup))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crates::domain::{
        entities::accounts::EmailEntity,
        value_objects::enums::{
            collection_methods::CollectionMethod, subscription_statuses::SubscriptionStatus,
        },
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    use super::*;
    use crate::usecases::test_support::{
        EMAIL, Mocks, UID, customer, stub_user, subscription, verified_user,
    };

    fn email_record(is_primary: bool, is_verified: bool) -> EmailEntity {
        EmailEntity {
            id: Uuid::new_v4(),
            uid: UID.to_string(),
            email: EMAIL.to_string(),
            is_verified,
            is_primary,
            created_at: Utc::now(),
        }
    }

    fn failed() -> UseCaseResult<()> {
        Err(SubscriptionError::MissingPaymentToken {
            customer_id: "cus_1".into(),
        })
    }

    #[tokio::test]
    async fn unverified_primary_without_subscriptions_is_deleted() {
        let mut mocks = Mocks::new();
        mocks
            .accounts
            .expect_find_email_record()
            .with(eq(EMAIL))
            .returning(|_| Ok(Some(email_record(true, false))));
        mocks
            .customers
            .expect_fetch_customer()
            .returning(|_, _| Ok(Some(customer("cus_1"))));
        mocks
            .accounts
            .expect_delete_account()
            .with(eq(UID))
            .times(1)
            .returning(|_| Ok(()));
        let services = mocks.into_services();

        let result = finish_with_stub_cleanup(&services, &stub_user(), failed()).await;

        assert!(matches!(result, Err(SubscriptionError::MissingPaymentToken { .. })));
    }

    #[tokio::test]
    async fn customer_with_subscriptions_is_kept() {
        let mut mocks = Mocks::new();
        mocks
            .accounts
            .expect_find_email_record()
            .returning(|_| Ok(Some(email_record(true, false))));
        mocks.customers.expect_fetch_customer().returning(|_, _| {
            let mut holder = customer("cus_1");
            holder.subscriptions.push(subscription(
                "sub_1",
                "price_1",
                SubscriptionStatus::Incomplete,
                CollectionMethod::ChargeAutomatically,
            ));
            Ok(Some(holder))
        });
        mocks.accounts.expect_delete_account().never();
        let services = mocks.into_services();

        let outcome = delete_account_if_unverified(&services, EMAIL).await.unwrap();

        assert_eq!(outcome, AccountDeletionOutcome::Kept);
    }

    #[tokio::test]
    async fn verified_secondary_email_keeps_original_error() {
        let mut mocks = Mocks::new();
        mocks
            .accounts
            .expect_find_email_record()
            .returning(|_| Ok(Some(email_record(false, true))));
        mocks.accounts.expect_delete_email().never();
        let services = mocks.into_services();

        let result = finish_with_stub_cleanup(&services, &stub_user(), failed()).await;

        assert!(matches!(result, Err(SubscriptionError::MissingPaymentToken { .. })));
    }

    #[tokio::test]
    async fn unexpected_cleanup_failure_replaces_original_error() {
        let mut mocks = Mocks::new();
        mocks
            .accounts
            .expect_find_email_record()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        let services = mocks.into_services();

        let result = finish_with_stub_cleanup(&services, &stub_user(), failed()).await;

        assert!(matches!(result, Err(SubscriptionError::AccountCleanup(_))));
    }

    #[tokio::test]
    async fn verified_accounts_and_successes_skip_cleanup() {
        let mut mocks = Mocks::new();
        mocks.accounts.expect_find_email_record().never();
        let services = mocks.into_services();

        let kept = finish_with_stub_cleanup(&services, &verified_user(), failed()).await;
        let ok = finish_with_stub_cleanup(&services, &stub_user(), Ok(7)).await;

        assert!(kept.is_err());
        assert_eq!(ok.unwrap(), 7);
    }
}
