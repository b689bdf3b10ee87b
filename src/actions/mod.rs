//! File actions module.
//!
//! Provides permanent, confirmation-gated deletion of duplicate files as a
//! best-effort batch: per-file failures are recorded and never stop the
//! remaining deletions.

pub mod delete;

pub use delete::{
    delete_batch, permanent_delete, AssumeYes, BatchDeleteResult, ConfirmDeletion, DeleteError,
    DeleteResult, DeletionPlan,
};
