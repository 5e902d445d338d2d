use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{accounts, emails};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = accounts)]
#[diesel(primary_key(uid))]
pub struct AccountEntity {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    /// 0 for accounts created without a password.
    pub verifier_set_at: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = emails)]
pub struct EmailEntity {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub is_verified: bool,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}
