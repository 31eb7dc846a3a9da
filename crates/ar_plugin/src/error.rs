//! Error types for manager operations that require a live, enabled manager.
//!
//! Absent capabilities are not errors: they surface as `None`, `false` or an
//! empty result set.

use thiserror::Error;

use crate::types::{TrackableId, TrackableKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArError {
  /// An add/remove operation was issued against a disabled manager.
  #[error("the {kind} manager is disabled")]
  ManagerDisabled { kind: TrackableKind },

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The id is not (or no longer) present in the manager's collection.
  #[error("no {kind} with id {id} is tracked")]
  UnknownTrackable { kind: TrackableKind, id: TrackableId },

  /// The provider forbids the requested operation.
  #[error("operation not supported: {0}")]
  Unsupported(&'static str),
}

pub type ArResult<T> = Result<T, ArError>;
