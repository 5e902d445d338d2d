use crates::domain::{
    entities::plans::AbbrevPlan, interfaces::mailer::FinishSetupEmail,
    value_objects::iam::AuthenticatedUser,
};
use tracing::{info, warn};

use super::services::BillingServices;

/// Tells attached services that the customer's billing state moved. Best effort.
pub async fn customer_changed(services: &BillingServices, uid: &str) {
    let (cache, push) = tokio::join!(
        services.profile.delete_cache(uid),
        services.push.notify_profile_updated(uid)
    );

    if let Err(err) = cache {
        warn!(%uid, error = ?err, "notifications: profile cache invalidation failed");
    }
    if let Err(err) = push {
        warn!(%uid, error = ?err, "notifications: profile-updated push failed");
    }
    info!(%uid, "notifications: customer change announced");
}

/// Passwordless accounts get a mail asking them to finish account setup.
pub async fn send_finish_setup_email_for_stub_account(
    services: &BillingServices,
    user: &AuthenticatedUser,
    plan: &AbbrevPlan,
    metrics_context: Option<serde_json::Value>,
) {
    if !user.account.is_stub() {
        return;
    }

    let message = FinishSetupEmail {
        uid: user.uid.clone(),
        email: user.email.clone(),
        product_id: plan.product_id.clone(),
        product_name: plan.product_name.clone(),
        metrics_context,
    };
    match services.mailer.send_finish_setup_email(&message).await {
        Ok(()) => info!(
            uid = %user.uid,
            product_id = %plan.product_id,
            "notifications: finish-setup email sent"
        ),
        Err(err) => warn!(
            uid = %user.uid,
            error = ?err,
            "notifications: finish-setup email failed"
        ),
    }
}
