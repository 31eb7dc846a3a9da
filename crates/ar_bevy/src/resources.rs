//! Bevy resources wrapping the engine-independent managers and providers.

use std::collections::HashMap;
use std::marker::PhantomData;

use ar_plugin::{
  Pose, RaycastDispatcher, RaycastProvider, SessionRelativeData, Trackable, TrackableId,
  TrackableManager, TrackingProvider,
};
use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;

/// One reconciliation engine per trackable kind.
#[derive(Resource, Deref, DerefMut)]
pub struct ArManager<D: SessionRelativeData>(pub TrackableManager<D>);

impl<D: SessionRelativeData> Default for ArManager<D> {
  fn default() -> Self {
    Self(TrackableManager::default())
  }
}

/// Type-erased tracking provider for one kind. Empty until the application
/// (or a platform plugin) installs one; ticks are skipped meanwhile.
#[derive(Resource)]
pub struct ArProvider<D: SessionRelativeData> {
  pub provider: Option<Box<dyn TrackingProvider<D> + Send + Sync>>,
}

impl<D: SessionRelativeData> Default for ArProvider<D> {
  fn default() -> Self {
    Self { provider: None }
  }
}

impl<D: SessionRelativeData> ArProvider<D> {
  pub fn new(provider: impl TrackingProvider<D> + Send + Sync + 'static) -> Self {
    Self {
      provider: Some(Box::new(provider)),
    }
  }
}

/// Visual spawned for every new trackable of kind `D`.
///
/// The closure decorates the freshly spawned entity (mesh, material, child
/// scene...). [`ArTrackable`](crate::ArTrackable) and the transform are
/// inserted after it runs and cannot be overridden.
///
/// # Example
/// ```ignore
/// app.insert_resource(TrackablePrefab::<Anchor>::new(move |entity, _| {
///     entity.insert((Mesh3d(cube.clone()), MeshMaterial3d(red.clone())));
/// }));
/// ```
#[derive(Resource)]
pub struct TrackablePrefab<D: SessionRelativeData> {
  spawn: Box<dyn Fn(&mut EntityCommands, &Trackable<D>) + Send + Sync>,
}

impl<D: SessionRelativeData> TrackablePrefab<D> {
  pub fn new(spawn: impl Fn(&mut EntityCommands, &Trackable<D>) + Send + Sync + 'static) -> Self {
    Self {
      spawn: Box::new(spawn),
    }
  }

  pub fn apply(&self, entity: &mut EntityCommands, trackable: &Trackable<D>) {
    (self.spawn)(entity, trackable);
  }
}

/// Resource mapping trackable ids to their backing entities.
#[derive(Resource)]
pub struct TrackableEntities<D: SessionRelativeData> {
  map: HashMap<TrackableId, Entity>,
  _marker: PhantomData<fn() -> D>,
}

impl<D: SessionRelativeData> Default for TrackableEntities<D> {
  fn default() -> Self {
    Self {
      map: HashMap::new(),
      _marker: PhantomData,
    }
  }
}

impl<D: SessionRelativeData> TrackableEntities<D> {
  pub fn insert(&mut self, id: TrackableId, entity: Entity) {
    self.map.insert(id, entity);
  }

  pub fn remove(&mut self, id: TrackableId) -> Option<Entity> {
    self.map.remove(&id)
  }

  pub fn get(&self, id: TrackableId) -> Option<Entity> {
    self.map.get(&id).copied()
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}

/// World pose of the [`ArTrackablesParent`](crate::ArTrackablesParent).
/// Identity when there is none.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct ArOriginPose(pub Pose);

/// Shared raycast dispatcher.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct ArRaycastDispatcher(pub RaycastDispatcher);

/// Provider answering native raycasts, if the platform offers them.
#[derive(Resource, Default)]
pub struct ArRaycastProvider {
  pub provider: Option<Box<dyn RaycastProvider + Send + Sync>>,
}

impl ArRaycastProvider {
  pub fn new(provider: impl RaycastProvider + Send + Sync + 'static) -> Self {
    Self {
      provider: Some(Box::new(provider)),
    }
  }
}
