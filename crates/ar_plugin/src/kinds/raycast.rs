//! Persistent raycasts, re-evaluated by the provider every frame.

use glam::Vec2;

use crate::error::{ArError, ArResult};
use crate::lifecycle::TrackableLifecycle;
use crate::manager::TrackableManager;
use crate::provider::RaycastTrackingProvider;
use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackableType, TrackingState};

/// Session-relative tracked raycast record.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedRaycast {
  pub trackable_id: TrackableId,
  /// Current hit pose.
  pub pose: Pose,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
  /// Distance from the ray origin to the hit.
  pub distance: f32,
  pub hit_type: TrackableType,
}

impl TrackedRaycast {
  pub fn new(trackable_id: TrackableId, pose: Pose, distance: f32) -> Self {
    Self {
      trackable_id,
      pose,
      tracking_state: TrackingState::Tracking,
      native_ptr: 0,
      distance,
      hit_type: TrackableType::NONE,
    }
  }
}

impl SessionRelativeData for TrackedRaycast {
  const KIND: TrackableKind = TrackableKind::Raycast;

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

impl TrackableManager<TrackedRaycast> {
  /// Start a persistent raycast from a normalized viewport point.
  pub fn add_raycast<P>(
    &mut self,
    provider: &mut P,
    lifecycle: &mut dyn TrackableLifecycle<TrackedRaycast>,
    viewport_point: Vec2,
    estimated_distance: f32,
  ) -> ArResult<Option<TrackableId>>
  where
    P: RaycastTrackingProvider + ?Sized,
  {
    self.ensure_enabled()?;
    if !estimated_distance.is_finite() || estimated_distance <= 0.0 {
      return Err(ArError::InvalidArgument(format!(
        "estimated distance must be positive, got {estimated_distance}"
      )));
    }
    if !provider.is_running() {
      return Ok(None);
    }
    let Some(raycast) = provider.try_add_raycast(viewport_point, estimated_distance) else {
      return Ok(None);
    };
    Ok(Some(self.place(raycast, lifecycle)))
  }
}
