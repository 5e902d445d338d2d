use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::account_customers;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = account_customers)]
#[diesel(primary_key(uid))]
pub struct AccountCustomerEntity {
    pub uid: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_customers)]
pub struct InsertAccountCustomerEntity {
    pub uid: String,
    pub stripe_customer_id: Option<String>,
}
