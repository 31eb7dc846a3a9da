//! Provider contracts.
//!
//! A provider is the platform backend that detects and tracks trackables. The
//! core never implements one; it only consumes the per-frame change-set and
//! the optional manual add/remove entry points.

use glam::{Vec2, Vec3};

use crate::kinds::{Anchor, EnvironmentProbe, TrackedRaycast};
use crate::raycast::RaycastHit;
use crate::trackable::SessionRelativeData;
use crate::types::{Pose, Ray, TrackableId, TrackableType};

/// One frame's worth of changes reported by a provider.
///
/// The three lists are disjoint. Buffers are reused across ticks, so
/// providers must append into them rather than replace them.
#[derive(Clone, Debug)]
pub struct TrackableChanges<D> {
  pub added: Vec<D>,
  pub updated: Vec<D>,
  pub removed: Vec<TrackableId>,
}

impl<D> Default for TrackableChanges<D> {
  fn default() -> Self {
    Self {
      added: Vec::new(),
      updated: Vec::new(),
      removed: Vec::new(),
    }
  }
}

impl<D> TrackableChanges<D> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all lists, preserving capacity.
  pub fn clear(&mut self) {
    self.added.clear();
    self.updated.clear();
    self.removed.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
  }
}

/// Per-kind tracking backend.
pub trait TrackingProvider<D: SessionRelativeData> {
  /// True while the provider can be queried. Ticks are skipped otherwise.
  fn is_running(&self) -> bool;

  /// Append this frame's changes to `changes`.
  fn get_changes(&mut self, changes: &mut TrackableChanges<D>);
}

/// Providers that let the application place and remove trackables.
pub trait ManualPlacementProvider<D: SessionRelativeData>: TrackingProvider<D> {
  /// Request a new trackable at a session-relative pose.
  fn try_add(&mut self, pose: Pose) -> Option<D>;

  /// Request removal of a trackable.
  fn try_remove(&mut self, id: TrackableId) -> bool;

  /// Whether trackables the provider placed on its own may be removed.
  fn supports_removal_of_automatic(&self) -> bool {
    true
  }
}

/// Anchor providers that can attach an anchor to another trackable.
pub trait AnchorProvider: ManualPlacementProvider<Anchor> {
  fn try_attach_anchor(
    &mut self,
    parent_id: TrackableId,
    pose: Pose,
  ) -> Option<Anchor>;
}

/// Environment probe providers with explicit scale and size on placement.
pub trait EnvironmentProbeProvider: ManualPlacementProvider<EnvironmentProbe> {
  fn try_add_environment_probe(
    &mut self,
    pose: Pose,
    scale: Vec3,
    size: Vec3,
  ) -> Option<EnvironmentProbe>;
}

/// Providers of persistent raycasts that are re-evaluated every frame.
pub trait RaycastTrackingProvider: ManualPlacementProvider<TrackedRaycast> {
  /// Start a raycast from a normalized viewport point.
  fn try_add_raycast(
    &mut self,
    viewport_point: Vec2,
    estimated_distance: f32,
  ) -> Option<TrackedRaycast>;
}

/// Native one-shot raycasting.
///
/// All rays and hits are session-relative; the dispatcher converts to and
/// from world space.
pub trait RaycastProvider {
  fn is_running(&self) -> bool {
    true
  }

  /// Trackable types the provider can hit natively.
  fn supported_trackable_types(&self) -> TrackableType;

  fn supports_world_raycast(&self) -> bool;

  fn supports_viewport_raycast(&self) -> bool;

  /// Append hits for `ray` restricted to `mask`.
  fn raycast_ray(&mut self, ray: &Ray, mask: TrackableType, hits: &mut Vec<RaycastHit>);

  /// Append hits for a normalized viewport point restricted to `mask`.
  fn raycast_viewport(&mut self, viewport_point: Vec2, mask: TrackableType, hits: &mut Vec<RaycastHit>);
}
