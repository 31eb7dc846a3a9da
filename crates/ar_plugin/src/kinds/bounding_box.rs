//! 3D bounding boxes around detected objects.

use glam::Vec3;

use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BoundingBoxClassification {
  #[default]
  None,
  Couch,
  Table,
  Bed,
  Lamp,
  Plant,
  Screen,
  Storage,
  Other,
}

/// Session-relative oriented box record.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
  pub trackable_id: TrackableId,
  /// Center of the box.
  pub pose: Pose,
  /// Full size along each local axis.
  pub size: Vec3,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
  pub classification: BoundingBoxClassification,
}

impl BoundingBox {
  pub fn new(trackable_id: TrackableId, pose: Pose, size: Vec3) -> Self {
    Self {
      trackable_id,
      pose,
      size,
      tracking_state: TrackingState::Tracking,
      native_ptr: 0,
      classification: BoundingBoxClassification::None,
    }
  }

  #[inline]
  pub fn half_extents(&self) -> Vec3 {
    self.size * 0.5
  }
}

impl SessionRelativeData for BoundingBox {
  const KIND: TrackableKind = TrackableKind::BoundingBox;

  fn trackable_id(&self) -> TrackableId {
    self.trackable_id
  }

  fn pose(&self) -> Pose {
    self.pose
  }

  fn tracking_state(&self) -> TrackingState {
    self.tracking_state
  }

  fn native_ptr(&self) -> usize {
    self.native_ptr
  }
}
