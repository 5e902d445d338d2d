use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountDeletionOutcome {
    Deleted,
    /// The account was verified or already had billing history.
    Kept,
    NotFound,
}

#[derive(Debug, Error)]
pub enum AccountCleanupError {
    #[error("account `{0}` exists and is verified")]
    AccountExists(String),
    #[error("a verified secondary email `{0}` blocks account deletion")]
    VerifiedSecondaryEmailExists(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountCleanupError {
    /// Errors that mean the account is real and simply must be left alone.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            AccountCleanupError::AccountExists(_)
                | AccountCleanupError::VerifiedSecondaryEmailExists(_)
        )
    }
}
