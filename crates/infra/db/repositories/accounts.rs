use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::accounts::{AccountEntity, EmailEntity},
        repositories::accounts::AccountRepository,
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{accounts, emails},
    },
};

pub struct AccountPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AccountPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AccountRepository for AccountPostgres {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let account = accounts::table
            .filter(accounts::uid.eq(uid))
            .select(AccountEntity::as_select())
            .first::<AccountEntity>(&mut conn)
            .optional()?;

        Ok(account)
    }

    async fn find_email_record(&self, email: &str) -> Result<Option<EmailEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let record = emails::table
            .filter(emails::email.eq(email.to_lowercase()))
            .select(EmailEntity::as_select())
            .first::<EmailEntity>(&mut conn)
            .optional()?;

        Ok(record)
    }

    async fn delete_account(&self, uid: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(emails::table.filter(emails::uid.eq(uid))).execute(conn)?;
            diesel::delete(accounts::table.filter(accounts::uid.eq(uid))).execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }

    async fn delete_email(&self, uid: &str, email: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(
            emails::table
                .filter(emails::uid.eq(uid))
                .filter(emails::email.eq(email.to_lowercase()))
                .filter(emails::is_primary.eq(false)),
        )
        .execute(&mut conn)?;

        Ok(())
    }
}
