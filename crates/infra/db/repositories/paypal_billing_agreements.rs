use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into};
use std::sync::Arc;

use crate::{
    domain::{
        entities::billing_agreements::InsertPaypalCustomerEntity,
        repositories::billing_agreement_records::BillingAgreementRecordRepository,
        value_objects::enums::billing_agreement_statuses::BillingAgreementStatus,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::paypal_customers},
};

pub struct PaypalCustomerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaypalCustomerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BillingAgreementRecordRepository for PaypalCustomerPostgres {
    async fn create_paypal_ba(
        &self,
        uid: &str,
        agreement_id: &str,
        status: BillingAgreementStatus,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let insert_entity = InsertPaypalCustomerEntity {
            uid: uid.to_string(),
            billing_agreement_id: agreement_id.to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
        };

        insert_into(paypal_customers::table)
            .values(&insert_entity)
            .execute(&mut conn)?;

        Ok(())
    }
}
