pub mod automatic_tax_statuses;
pub mod billing_agreement_statuses;
pub mod collection_methods;
pub mod eligibility_results;
pub mod entitlement_platforms;
pub mod invoice_statuses;
pub mod subscription_statuses;
