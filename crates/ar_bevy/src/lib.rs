//! Bevy presentation layer for ar_plugin.
//!
//! This crate bridges the engine-independent trackable managers with Bevy:
//! every trackable is backed by an entity, plane boundaries become meshes and
//! raycasts are available as a system parameter.

pub mod components;
pub mod lifecycle;
pub mod mesh;
pub mod messages;
pub mod raycast;
pub mod resources;
pub mod systems;

use std::marker::PhantomData;

use ar_plugin::{
  Anchor, BoundedPlane, BoundingBox, EnvironmentProbe, Marker, SessionRelativeData,
  TrackableManager, TrackableManagerConfig, TrackedImage, TrackedRaycast,
};
use bevy::prelude::*;
pub use components::*;
pub use mesh::{plane_mesh_to_bevy, PlaneMeshSettings};
pub use messages::TrackablesUpdated;
pub use raycast::ArRaycast;
pub use resources::*;

/// Systems run in this order every frame.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArSystems {
  /// Track the trackables parent's pose.
  Origin,
  /// Reconcile every manager with its provider.
  Trackables,
  /// Move attached trackables with their parent trackables.
  Attachments,
  /// Consume [`TrackablesUpdated`] messages (plane meshes, application code).
  Visuals,
}

/// Tracks the trackables parent. Added by every [`ArTrackablesPlugin`].
pub struct ArOriginPlugin;

impl Plugin for ArOriginPlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<ArOriginPose>()
      .configure_sets(
        Update,
        (
          ArSystems::Origin,
          ArSystems::Trackables,
          ArSystems::Attachments,
          ArSystems::Visuals,
        )
          .chain(),
      )
      .add_systems(
        Update,
        systems::update_origin_pose.in_set(ArSystems::Origin),
      );
  }
}

/// Drives one trackable kind: manager, provider slot, entity map and message.
pub struct ArTrackablesPlugin<D: SessionRelativeData> {
  pub config: TrackableManagerConfig,
  _marker: PhantomData<fn() -> D>,
}

impl<D: SessionRelativeData> Default for ArTrackablesPlugin<D> {
  fn default() -> Self {
    Self::new(TrackableManagerConfig::default())
  }
}

impl<D: SessionRelativeData> ArTrackablesPlugin<D> {
  pub fn new(config: TrackableManagerConfig) -> Self {
    Self {
      config,
      _marker: PhantomData,
    }
  }
}

impl<D: SessionRelativeData> Plugin for ArTrackablesPlugin<D> {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<ArOriginPlugin>() {
      app.add_plugins(ArOriginPlugin);
    }
    if !app.world().contains_resource::<ArManager<D>>() {
      app.insert_resource(ArManager(TrackableManager::<D>::new(self.config.clone())));
    }
    app
      .init_resource::<ArProvider<D>>()
      .init_resource::<TrackableEntities<D>>()
      .add_message::<TrackablesUpdated<D>>()
      .add_systems(
        Update,
        systems::update_trackables::<D>.in_set(ArSystems::Trackables),
      );
  }
}

/// Bevy plugin for every trackable kind plus plane meshes and raycasts.
pub struct ArFoundationPlugin;

impl Plugin for ArFoundationPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_plugins((
        ArTrackablesPlugin::<Anchor>::default(),
        ArTrackablesPlugin::<BoundedPlane>::default(),
        ArTrackablesPlugin::<TrackedImage>::default(),
        ArTrackablesPlugin::<Marker>::default(),
        ArTrackablesPlugin::<BoundingBox>::default(),
        ArTrackablesPlugin::<EnvironmentProbe>::default(),
        ArTrackablesPlugin::<TrackedRaycast>::default(),
      ))
      .init_resource::<ArRaycastDispatcher>()
      .init_resource::<ArRaycastProvider>()
      .init_resource::<PlaneMeshSettings>()
      .add_systems(
        Update,
        (
          systems::sync_attached_trackables::<BoundedPlane, Anchor>.in_set(ArSystems::Attachments),
          mesh::update_plane_meshes.in_set(ArSystems::Visuals),
        ),
      );
  }
}
