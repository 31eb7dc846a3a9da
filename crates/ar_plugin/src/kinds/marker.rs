//! Fiducial markers (QR codes, AprilTags, ArUco).

use glam::Vec2;

use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MarkerType {
  #[default]
  Unknown,
  QrCode,
  AprilTag,
  ArUco,
}

/// Session-relative marker record.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
  pub trackable_id: TrackableId,
  pub pose: Pose,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
  pub marker_type: MarkerType,
  /// Dictionary id for AprilTag/ArUco markers.
  pub marker_id: u32,
  pub size: Vec2,
  /// Decoded payload (QR codes).
  pub data: Option<String>,
}

impl Marker {
  pub fn new(trackable_id: TrackableId, pose: Pose, marker_type: MarkerType) -> Self {
    Self {
      trackable_id,
      pose,
      tracking_state: TrackingState::Tracking,
      native_ptr: 0,
      marker_type,
      marker_id: 0,
      size: Vec2::ZERO,
      data: None,
    }
  }
}

impl SessionRelativeData for Marker {
  const KIND: TrackableKind = TrackableKind::Marker;

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
