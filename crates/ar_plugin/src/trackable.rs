//! Trackable entity model.
//!
//! A provider reports immutable [`SessionRelativeData`] records every frame.
//! The manager keeps one [`Trackable`] per id, replacing its data in place and
//! recomputing where it sits in its parent's coordinate space.

use std::collections::hash_map;
use std::collections::HashMap;

use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

/// Per-kind record produced by the provider, expressed relative to the
/// tracking origin (session space).
pub trait SessionRelativeData: Clone + Send + Sync + 'static {
  /// Kind of trackable this record describes.
  const KIND: TrackableKind;

  fn trackable_id(&self) -> TrackableId;

  /// Pose relative to the tracking origin.
  fn pose(&self) -> Pose;

  fn tracking_state(&self) -> TrackingState;

  /// Opaque provider handle. Zero when the provider exposes none.
  fn native_ptr(&self) -> usize {
    0
  }

  /// Trackable this one is attached to, if any.
  fn parent_id(&self) -> Option<TrackableId> {
    None
  }

  /// True when the provider placed this trackable on its own rather than in
  /// response to an application request.
  fn is_automatically_placed(&self) -> bool {
    false
  }
}

// =============================================================================
// Placement
// =============================================================================

/// The coordinate frame a trackable's local pose is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum ParentSpace {
  /// Child of the trackables parent (the tracking origin). The local pose is
  /// the session-relative pose.
  #[default]
  TrackablesParent,
  /// Attached to another trackable (an anchor on a plane), given the parent
  /// trackable's id and world pose.
  Trackable { id: TrackableId, world: Pose },
  /// Child of some other scene node, given by its world pose.
  Other(Pose),
}

impl ParentSpace {
  /// World pose of the parent, `None` for the trackables parent.
  pub fn parent_world_pose(&self) -> Option<Pose> {
    match *self {
      ParentSpace::TrackablesParent => None,
      ParentSpace::Trackable { world, .. } | ParentSpace::Other(world) => Some(world),
    }
  }
}

/// Where a trackable sits in its parent's space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Placement {
  pub parent: ParentSpace,
  pub local_pose: Pose,
}

impl Placement {
  /// Compute the local pose for a session pose, given the world pose of the
  /// trackables parent.
  pub fn resolve(parent: ParentSpace, session_pose: &Pose, origin: &Pose) -> Self {
    let local_pose = match parent.parent_world_pose() {
      None => *session_pose,
      Some(parent_world) => {
        let world = origin.transform_pose(session_pose);
        parent_world.inverse_transform_pose(&world)
      }
    };
    Self { parent, local_pose }
  }

  /// World pose of the trackable.
  pub fn world_pose(&self, origin: &Pose) -> Pose {
    match self.parent.parent_world_pose() {
      None => origin.transform_pose(&self.local_pose),
      Some(parent_world) => parent_world.transform_pose(&self.local_pose),
    }
  }
}

// =============================================================================
// Trackable<D>
// =============================================================================

/// One persistent object per tracked id.
#[derive(Clone, Debug)]
pub struct Trackable<D: SessionRelativeData> {
  data: D,
  pending: bool,
  manually_placed: bool,
  /// Destroy the backing object when the provider reports removal. When
  /// false the object is released to the application instead.
  pub destroy_on_removal: bool,
  placement: Placement,
}

impl<D: SessionRelativeData> Trackable<D> {
  pub(crate) fn new(data: D, destroy_on_removal: bool) -> Self {
    Self {
      data,
      pending: false,
      manually_placed: false,
      destroy_on_removal,
      placement: Placement::default(),
    }
  }

  #[inline]
  pub fn trackable_id(&self) -> TrackableId {
    self.data.trackable_id()
  }

  #[inline]
  pub fn session_relative_data(&self) -> &D {
    &self.data
  }

  /// Session-relative pose from the latest provider data.
  #[inline]
  pub fn session_relative_pose(&self) -> Pose {
    self.data.pose()
  }

  #[inline]
  pub fn tracking_state(&self) -> TrackingState {
    self.data.tracking_state()
  }

  /// True while the application created this trackable and the provider has
  /// not yet reported it.
  #[inline]
  pub fn pending(&self) -> bool {
    self.pending
  }

  /// True when this trackable was created through an application request.
  #[inline]
  pub fn manually_placed(&self) -> bool {
    self.manually_placed
  }

  #[inline]
  pub fn placement(&self) -> &Placement {
    &self.placement
  }

  #[inline]
  pub fn world_pose(&self, origin: &Pose) -> Pose {
    self.placement.world_pose(origin)
  }

  pub(crate) fn set_pending(&mut self, pending: bool) {
    self.pending = pending;
  }

  pub(crate) fn set_manually_placed(&mut self) {
    self.manually_placed = true;
  }

  pub(crate) fn set_session_relative_data(&mut self, data: D) {
    self.data = data;
  }

  /// Recompute the local pose from the latest session pose.
  pub(crate) fn reposition(&mut self, origin: &Pose) {
    self.reposition_under(self.placement.parent, origin);
  }

  /// Recompute the local pose from the latest session pose under `parent`.
  pub(crate) fn reposition_under(&mut self, parent: ParentSpace, origin: &Pose) {
    self.placement = Placement::resolve(parent, &self.data.pose(), origin);
  }

  /// Move under `parent`, keeping the world pose.
  pub(crate) fn set_parent(&mut self, parent: ParentSpace, origin: &Pose) {
    let world = self.placement.world_pose(origin);
    let local_pose = match parent.parent_world_pose() {
      None => origin.inverse_transform_pose(&world),
      Some(parent_world) => parent_world.inverse_transform_pose(&world),
    };
    self.placement = Placement { parent, local_pose };
  }

  /// The parent moved; keep the local pose so this trackable moves with it.
  pub(crate) fn follow_parent(&mut self, parent: ParentSpace) {
    self.placement.parent = parent;
  }
}

// =============================================================================
// TrackableCollection
// =============================================================================

/// Read-only view over a manager's live trackables.
pub struct TrackableCollection<'a, D: SessionRelativeData> {
  map: &'a HashMap<TrackableId, Trackable<D>>,
}

impl<'a, D: SessionRelativeData> Clone for TrackableCollection<'a, D> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<'a, D: SessionRelativeData> Copy for TrackableCollection<'a, D> {}

impl<'a, D: SessionRelativeData> TrackableCollection<'a, D> {
  pub(crate) fn new(map: &'a HashMap<TrackableId, Trackable<D>>) -> Self {
    Self { map }
  }

  pub fn get(&self, id: TrackableId) -> Option<&'a Trackable<D>> {
    self.map.get(&id)
  }

  pub fn contains(&self, id: TrackableId) -> bool {
    self.map.contains_key(&id)
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }

  pub fn iter(&self) -> hash_map::Values<'a, TrackableId, Trackable<D>> {
    self.map.values()
  }

  pub fn ids(&self) -> hash_map::Keys<'a, TrackableId, Trackable<D>> {
    self.map.keys()
  }
}

impl<'a, D: SessionRelativeData> IntoIterator for TrackableCollection<'a, D> {
  type Item = &'a Trackable<D>;
  type IntoIter = hash_map::Values<'a, TrackableId, Trackable<D>>;

  fn into_iter(self) -> Self::IntoIter {
    self.map.values()
  }
}
