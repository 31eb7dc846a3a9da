//! Per-kind change messages.

use std::marker::PhantomData;

use ar_plugin::{ChangeSummary, SessionRelativeData, TrackableId};
use bevy::prelude::*;

/// Written once per tick in which trackables of kind `D` changed.
///
/// By the time systems read it, removed trackables have already been
/// destroyed; only their ids remain.
#[derive(Message, Clone, Debug)]
pub struct TrackablesUpdated<D: SessionRelativeData> {
  pub added: Vec<TrackableId>,
  pub updated: Vec<TrackableId>,
  pub removed: Vec<TrackableId>,
  _marker: PhantomData<fn() -> D>,
}

impl<D: SessionRelativeData> From<ChangeSummary> for TrackablesUpdated<D> {
  fn from(summary: ChangeSummary) -> Self {
    Self {
      added: summary.added,
      updated: summary.updated,
      removed: summary.removed,
      _marker: PhantomData,
    }
  }
}

impl<D: SessionRelativeData> TrackablesUpdated<D> {
  /// Added and updated ids, in processing order.
  pub fn changed(&self) -> impl Iterator<Item = TrackableId> + '_ {
    self.added.iter().chain(&self.updated).copied()
  }
}
