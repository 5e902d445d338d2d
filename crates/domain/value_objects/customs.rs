use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CustomsVerdict {
    Allowed,
    Blocked { retry_after_secs: Option<u64> },
}
