use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::entitlement_platforms::EntitlementPlatform,
    infra::db::postgres::schema::external_entitlements,
};

/// A product bought outside the billing provider, e.g. through an app store.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = external_entitlements)]
pub struct ExternalEntitlementEntity {
    pub id: Uuid,
    pub uid: String,
    pub platform: String,
    pub product_id: String,
    pub product_set: Option<String>,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ExternalEntitlementEntity {
    pub fn platform(&self) -> Option<EntitlementPlatform> {
        EntitlementPlatform::from_str(&self.platform)
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let live_status = matches!(self.status.as_str(), "active" | "grace_period");
        live_status && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}
