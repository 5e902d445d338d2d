use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::value_objects::enums::billing_agreement_statuses::BillingAgreementStatus,
    infra::db::postgres::schema::paypal_customers,
};

/// What the processor reports about a billing agreement and its payer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgreementDetails {
    pub status: BillingAgreementStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = paypal_customers)]
#[diesel(primary_key(uid, billing_agreement_id))]
pub struct PaypalCustomerEntity {
    pub uid: String,
    pub billing_agreement_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = paypal_customers)]
pub struct InsertPaypalCustomerEntity {
    pub uid: String,
    pub billing_agreement_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
