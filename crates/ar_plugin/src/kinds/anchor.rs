//! Anchors - application-placed points of interest.

use crate::error::{ArError, ArResult};
use crate::lifecycle::TrackableLifecycle;
use crate::manager::TrackableManager;
use crate::provider::AnchorProvider;
use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

/// Session-relative anchor record.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
  pub trackable_id: TrackableId,
  pub pose: Pose,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
  /// Session that created the anchor.
  pub session_id: u128,
  /// Trackable this anchor is attached to.
  pub parent_id: Option<TrackableId>,
}

impl Anchor {
  pub fn new(trackable_id: TrackableId, pose: Pose, tracking_state: TrackingState) -> Self {
    Self {
      trackable_id,
      pose,
      tracking_state,
      native_ptr: 0,
      session_id: 0,
      parent_id: None,
    }
  }

  pub fn with_parent(mut self, parent_id: TrackableId) -> Self {
    self.parent_id = Some(parent_id);
    self
  }
}

impl SessionRelativeData for Anchor {
  const KIND: TrackableKind = TrackableKind::Anchor;

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

  fn parent_id(&self) -> Option<TrackableId> {
    self.parent_id
  }
}

impl TrackableManager<Anchor> {
  /// Attach a new anchor to another trackable (typically a plane) at a world
  /// pose. The anchor is pending until the provider reports it.
  pub fn attach_anchor<P>(
    &mut self,
    provider: &mut P,
    lifecycle: &mut dyn TrackableLifecycle<Anchor>,
    parent_id: TrackableId,
    pose: Pose,
  ) -> ArResult<Option<TrackableId>>
  where
    P: AnchorProvider + ?Sized,
  {
    self.ensure_enabled()?;
    if !parent_id.is_valid() {
      return Err(ArError::InvalidArgument(
        "cannot attach an anchor to an invalid trackable id".to_string(),
      ));
    }
    if !provider.is_running() {
      return Ok(None);
    }
    let session_pose = self.session_pose_from_world(&pose);
    let Some(anchor) = provider.try_attach_anchor(parent_id, session_pose) else {
      return Ok(None);
    };
    Ok(Some(self.place(anchor, lifecycle)))
  }
}
