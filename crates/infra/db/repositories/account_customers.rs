use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;

use crate::{
    domain::{
        entities::account_customers::{AccountCustomerEntity, InsertAccountCustomerEntity},
        repositories::account_customers::AccountCustomerRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::account_customers},
};

pub struct AccountCustomerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AccountCustomerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AccountCustomerRepository for AccountCustomerPostgres {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountCustomerEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = account_customers::table
            .filter(account_customers::uid.eq(uid))
            .select(AccountCustomerEntity::as_select())
            .first::<AccountCustomerEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn upsert_stripe_customer_id(&self, uid: &str, stripe_customer_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let insert_entity = InsertAccountCustomerEntity {
            uid: uid.to_string(),
            stripe_customer_id: Some(stripe_customer_id.to_string()),
        };

        insert_into(account_customers::table)
            .values(&insert_entity)
            .on_conflict(account_customers::uid)
            .do_update()
            .set((
                account_customers::stripe_customer_id
                    .eq(excluded(account_customers::stripe_customer_id)),
                account_customers::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
