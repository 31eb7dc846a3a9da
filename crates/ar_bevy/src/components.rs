//! Bevy components for AR trackables.

use ar_plugin::{SessionRelativeData, Trackable, TrackableId, TrackableKind, TrackingState};
use bevy::prelude::*;

/// Component on the entity backing one trackable.
///
/// Removed when the provider drops a trackable that was configured not to be
/// destroyed; the entity then belongs to the application.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ArTrackable {
  pub id: TrackableId,
  pub kind: TrackableKind,
  /// Created by the application and not yet confirmed by the provider.
  pub pending: bool,
  pub tracking_state: TrackingState,
}

impl<D: SessionRelativeData> From<&Trackable<D>> for ArTrackable {
  fn from(trackable: &Trackable<D>) -> Self {
    Self {
      id: trackable.trackable_id(),
      kind: D::KIND,
      pending: trackable.pending(),
      tracking_state: trackable.tracking_state(),
    }
  }
}

/// Marker for the trackables parent (the tracking origin).
///
/// At most one entity should carry it. Trackables are spawned as its
/// children and their transforms are session-relative poses.
///
/// # Example
/// ```ignore
/// commands.spawn((Transform::from_xyz(0.0, 1.5, 0.0), ArTrackablesParent));
/// ```
#[derive(Component, Default)]
pub struct ArTrackablesParent;
