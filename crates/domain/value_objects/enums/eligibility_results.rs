use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityResult {
    Create,
    /// The product is already held, possibly through another rail.
    BlockedExistingEquivalent,
    /// Another tier of the same product set is held.
    BlockedConflicting,
}

impl EligibilityResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityResult::Create => "create",
            EligibilityResult::BlockedExistingEquivalent => "blocked_existing_equivalent",
            EligibilityResult::BlockedConflicting => "blocked_conflicting",
        }
    }
}

impl Display for EligibilityResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
