use crate::types::DbId;

/// Failure reported by a fetch or write collaborator.
///
/// One error per collaborator call; the core never retries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Could not decode {entity} row: {reason}")]
    Decode { entity: &'static str, reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Rejected by store: {0}")]
    Rejected(String),
}

/// Errors surfaced by a feed build cycle or a feed mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to fetch {entity}: {source}")]
    Fetch {
        entity: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to resolve {reference} references: {source}")]
    ReferenceResolution {
        reference: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Write rejected ({operation}): {source}")]
    Write {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("No authenticated viewer")]
    Unauthenticated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Build cycle superseded by a newer refresh")]
    Superseded,
}

impl FeedError {
    pub fn fetch(entity: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Fetch { entity, source }
    }

    pub fn reference(reference: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::ReferenceResolution { reference, source }
    }

    pub fn write(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Write { operation, source }
    }
}

impl From<validator::ValidationErrors> for FeedError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
