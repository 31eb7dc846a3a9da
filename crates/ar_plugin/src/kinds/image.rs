//! 2D images recognized in the environment.

use glam::Vec2;

use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

/// Session-relative tracked image record.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedImage {
  pub trackable_id: TrackableId,
  /// Reference library entry that matched.
  pub source_image_id: u128,
  /// Center of the image; the image lies in the pose's XZ plane.
  pub pose: Pose,
  /// Physical width and height in meters.
  pub size: Vec2,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
}

impl TrackedImage {
  pub fn new(trackable_id: TrackableId, source_image_id: u128, pose: Pose, size: Vec2) -> Self {
    Self {
      trackable_id,
      source_image_id,
      pose,
      size,
      tracking_state: TrackingState::Tracking,
      native_ptr: 0,
    }
  }

  pub fn extents(&self) -> Vec2 {
    self.size * 0.5
  }
}

impl SessionRelativeData for TrackedImage {
  const KIND: TrackableKind = TrackableKind::Image;

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
