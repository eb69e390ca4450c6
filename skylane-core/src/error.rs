use skylane_shared::InvalidTransition;

/// Persistence-level failure. Any of these aborts the whole unit of work;
/// the store commits on success and rolls back otherwise.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("datastore failure: {0}")]
    Backend(String),
}

/// Operation-level error taxonomy. Eligibility failures are deliberately
/// absent: they surface as empty or partial candidate sets, not errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{action} is only allowed at least {window_hours} hours before departure")]
    PolicyWindow {
        action: &'static str,
        window_hours: i64,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    State(#[from] InvalidTransition),

    #[error(transparent)]
    Datastore(#[from] StoreError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }
}
