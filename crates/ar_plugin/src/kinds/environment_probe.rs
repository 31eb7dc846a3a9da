//! Environment probes capture surrounding light for reflections.

use glam::Vec3;

use crate::error::ArResult;
use crate::lifecycle::TrackableLifecycle;
use crate::manager::TrackableManager;
use crate::provider::EnvironmentProbeProvider;
use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

/// Who placed a probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ProbePlacement {
  #[default]
  Manual,
  Automatic,
}

/// Session-relative environment probe record.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentProbe {
  pub trackable_id: TrackableId,
  pub pose: Pose,
  pub scale: Vec3,
  /// Full size of the probe's volume of influence.
  pub size: Vec3,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
  pub placement: ProbePlacement,
}

impl EnvironmentProbe {
  pub fn new(trackable_id: TrackableId, pose: Pose, placement: ProbePlacement) -> Self {
    Self {
      trackable_id,
      pose,
      scale: Vec3::ONE,
      size: Vec3::splat(f32::INFINITY),
      tracking_state: TrackingState::Tracking,
      native_ptr: 0,
      placement,
    }
  }

  pub fn extents(&self) -> Vec3 {
    self.size * 0.5
  }
}

impl SessionRelativeData for EnvironmentProbe {
  const KIND: TrackableKind = TrackableKind::EnvironmentProbe;

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

  fn is_automatically_placed(&self) -> bool {
    self.placement == ProbePlacement::Automatic
  }
}

impl TrackableManager<EnvironmentProbe> {
  /// Place a probe at a world pose with explicit scale and size.
  pub fn add_environment_probe<P>(
    &mut self,
    provider: &mut P,
    lifecycle: &mut dyn TrackableLifecycle<EnvironmentProbe>,
    pose: Pose,
    scale: Vec3,
    size: Vec3,
  ) -> ArResult<Option<TrackableId>>
  where
    P: EnvironmentProbeProvider + ?Sized,
  {
    self.ensure_enabled()?;
    if !provider.is_running() {
      return Ok(None);
    }
    let session_pose = self.session_pose_from_world(&pose);
    let Some(probe) = provider.try_add_environment_probe(session_pose, scale, size) else {
      return Ok(None);
    };
    Ok(Some(self.place(probe, lifecycle)))
  }
}
