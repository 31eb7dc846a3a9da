//! TrackableLifecycle - callback interface for engine bridges.
//!
//! This trait allows the reconciliation engine to notify engine-specific code
//! (Bevy, Unity, Godot) about the backing object of each trackable without
//! depending on any specific engine.

use crate::trackable::{SessionRelativeData, Trackable};

/// Callback interface for the scene objects that back trackables.
///
/// # Example (Bevy)
///
/// ```ignore
/// impl TrackableLifecycle<BoundedPlane> for PlaneSpawner<'_> {
///     fn on_created(&mut self, trackable: &Trackable<BoundedPlane>) {
///         let entity = self.commands.spawn(ArTrackable::from(trackable)).id();
///         self.entities.insert(trackable.trackable_id(), entity);
///     }
///     // ...
/// }
/// ```
pub trait TrackableLifecycle<D: SessionRelativeData> {
  /// A new trackable was inserted into the collection. The backing object
  /// must be created here, even if no visual is configured.
  fn on_created(&mut self, trackable: &Trackable<D>);

  /// Session data was replaced and the placement recomputed.
  fn on_updated(&mut self, _trackable: &Trackable<D>) {}

  /// Destroy the backing object.
  fn destroy(&mut self, trackable: Trackable<D>);

  /// The provider removed a trackable whose `destroy_on_removal` is false.
  /// The backing object stays alive and is no longer managed.
  fn release(&mut self, _trackable: Trackable<D>) {}
}

/// No-op implementation for testing and headless operation.
pub struct NullLifecycle;

impl<D: SessionRelativeData> TrackableLifecycle<D> for NullLifecycle {
  fn on_created(&mut self, _trackable: &Trackable<D>) {
    // No-op
  }

  fn destroy(&mut self, _trackable: Trackable<D>) {
    // No-op
  }
}
