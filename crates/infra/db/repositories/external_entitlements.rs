use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::external_entitlements::ExternalEntitlementEntity,
        repositories::external_entitlements::ExternalEntitlementRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::external_entitlements},
};

pub struct ExternalEntitlementPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ExternalEntitlementPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ExternalEntitlementRepository for ExternalEntitlementPostgres {
    async fn list_for_uid(&self, uid: &str) -> Result<Vec<ExternalEntitlementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = external_entitlements::table
            .filter(external_entitlements::uid.eq(uid))
            .order(external_entitlements::updated_at.desc())
            .select(ExternalEntitlementEntity::as_select())
            .load::<ExternalEntitlementEntity>(&mut conn)?;

        Ok(rows)
    }
}
