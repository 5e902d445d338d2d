use crates::domain::value_objects::{
    accounts::AccountCleanupError, enums::eligibility_results::EligibilityResult,
};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("unauthorized for route")]
    Unauthorized,
    #[error("the request was blocked for security reasons")]
    RequestBlocked { retry_after_secs: Option<u64> },
    #[error("unknown customer for uid `{uid}`")]
    UnknownCustomer { uid: String },
    #[error("unknown subscription `{subscription_id}`")]
    UnknownSubscription { subscription_id: String },
    #[error("unknown subscription plan `{plan_id}`")]
    UnknownSubscriptionPlan { plan_id: String },
    #[error("missing PayPal payment token for customer `{customer_id}`")]
    MissingPaymentToken { customer_id: String },
    #[error("billing agreement already on file for customer `{customer_id}`")]
    BillingAgreementAlreadyExists { customer_id: String },
    #[error("PayPal customer `{customer_id}` has no billing agreement")]
    MissingBillingAgreement { customer_id: String },
    #[error("currency `{currency}` is not compatible with country `{country}`")]
    CurrencyCountryMismatch { currency: String, country: String },
    #[error("customer currency `{current}` does not match plan currency `{requested}`")]
    CurrencyCurrencyMismatch { current: String, requested: String },
    #[error("invalid promotion code `{code}`")]
    InvalidPromotionCode { code: String },
    #[error("user already subscribed to `{product_id}` ({result})")]
    UserAlreadySubscribed {
        product_id: String,
        result: EligibilityResult,
    },
    #[error("subscription `{subscription_id}` holds more than one plan")]
    MultiPlanSubscriptionUnsupported { subscription_id: String },
    #[error("plan `{from}` cannot be changed to `{to}`")]
    InvalidPlanUpdate { from: String, to: String },
    #[error("{operation}: {message}")]
    InternalValidation {
        operation: &'static str,
        message: String,
    },
    #[error("stub account cleanup failed: {0}")]
    AccountCleanup(#[source] AccountCleanupError),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Stable numbers clients key their error handling on.
pub mod errno {
    pub const UNAUTHORIZED: u16 = 110;
    pub const REQUEST_BLOCKED: u16 = 125;
    pub const UNKNOWN_CUSTOMER: u16 = 176;
    pub const UNKNOWN_SUBSCRIPTION: u16 = 177;
    pub const UNKNOWN_SUBSCRIPTION_PLAN: u16 = 178;
    pub const INVALID_PLAN_UPDATE: u16 = 181;
    pub const MULTI_PLAN_SUBSCRIPTION: u16 = 182;
    pub const USER_ALREADY_SUBSCRIBED: u16 = 183;
    pub const CURRENCY_COUNTRY_MISMATCH: u16 = 187;
    pub const CURRENCY_CURRENCY_MISMATCH: u16 = 188;
    pub const BILLING_AGREEMENT_EXISTS: u16 = 192;
    pub const MISSING_PAYMENT_TOKEN: u16 = 193;
    pub const MISSING_BILLING_AGREEMENT: u16 = 194;
    pub const INVALID_PROMOTION_CODE: u16 = 195;
    pub const INTERNAL_VALIDATION: u16 = 998;
    pub const UNEXPECTED: u16 = 999;
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::Unauthorized => StatusCode::UNAUTHORIZED,
            SubscriptionError::RequestBlocked { .. } => StatusCode::TOO_MANY_REQUESTS,
            SubscriptionError::UnknownCustomer { .. }
            | SubscriptionError::UnknownSubscription { .. } => StatusCode::NOT_FOUND,
            SubscriptionError::UnknownSubscriptionPlan { .. }
            | SubscriptionError::MissingPaymentToken { .. }
            | SubscriptionError::BillingAgreementAlreadyExists { .. }
            | SubscriptionError::MissingBillingAgreement { .. }
            | SubscriptionError::CurrencyCountryMismatch { .. }
            | SubscriptionError::CurrencyCurrencyMismatch { .. }
            | SubscriptionError::InvalidPromotionCode { .. }
            | SubscriptionError::MultiPlanSubscriptionUnsupported { .. }
            | SubscriptionError::InvalidPlanUpdate { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::UserAlreadySubscribed { .. } => StatusCode::CONFLICT,
            SubscriptionError::InternalValidation { .. }
            | SubscriptionError::AccountCleanup(_)
            | SubscriptionError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn errno(&self) -> u16 {
        match self {
            SubscriptionError::Unauthorized => errno::UNAUTHORIZED,
            SubscriptionError::RequestBlocked { .. } => errno::REQUEST_BLOCKED,
            SubscriptionError::UnknownCustomer { .. } => errno::UNKNOWN_CUSTOMER,
            SubscriptionError::UnknownSubscription { .. } => errno::UNKNOWN_SUBSCRIPTION,
            SubscriptionError::UnknownSubscriptionPlan { .. } => errno::UNKNOWN_SUBSCRIPTION_PLAN,
            SubscriptionError::MissingPaymentToken { .. } => errno::MISSING_PAYMENT_TOKEN,
            SubscriptionError::BillingAgreementAlreadyExists { .. } => {
                errno::BILLING_AGREEMENT_EXISTS
            }
            SubscriptionError::MissingBillingAgreement { .. } => errno::MISSING_BILLING_AGREEMENT,
            SubscriptionError::CurrencyCountryMismatch { .. } => errno::CURRENCY_COUNTRY_MISMATCH,
            SubscriptionError::CurrencyCurrencyMismatch { .. } => {
                errno::CURRENCY_CURRENCY_MISMATCH
            }
            SubscriptionError::InvalidPromotionCode { .. } => errno::INVALID_PROMOTION_CODE,
            SubscriptionError::UserAlreadySubscribed { .. } => errno::USER_ALREADY_SUBSCRIBED,
            SubscriptionError::MultiPlanSubscriptionUnsupported { .. } => {
                errno::MULTI_PLAN_SUBSCRIPTION
            }
            SubscriptionError::InvalidPlanUpdate { .. } => errno::INVALID_PLAN_UPDATE,
            SubscriptionError::InternalValidation { .. } => errno::INTERNAL_VALIDATION,
            SubscriptionError::AccountCleanup(_) | SubscriptionError::Upstream(_) => {
                errno::UNEXPECTED
            }
        }
    }

    pub fn internal_validation(operation: &'static str, message: impl Into<String>) -> Self {
        SubscriptionError::InternalValidation {
            operation,
            message: message.into(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let status = self.status_code();
        ErrorResponse {
            code: status.as_u16(),
            errno: self.errno(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
            retry_after: match self {
                SubscriptionError::RequestBlocked { retry_after_secs } => *retry_after_secs,
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: u16,
    pub errno: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;
