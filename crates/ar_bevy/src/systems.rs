//! Per-frame systems driving the trackable managers.

use std::collections::BTreeSet;

use ar_plugin::{SessionRelativeData, TrackableId, TrackingProvider};
use bevy::prelude::*;

use crate::components::ArTrackablesParent;
use crate::lifecycle::{global_transform_to_pose, trackable_transform, EntityLifecycle};
use crate::messages::TrackablesUpdated;
use crate::resources::{
  ArManager, ArOriginPose, ArProvider, ArRaycastDispatcher, TrackableEntities, TrackablePrefab,
};

/// System to sync the trackables parent's GlobalTransform into
/// [`ArOriginPose`] and the raycast dispatcher.
pub fn update_origin_pose(
  parents: Query<&GlobalTransform, With<ArTrackablesParent>>,
  mut origin: ResMut<ArOriginPose>,
  dispatcher: Option<ResMut<ArRaycastDispatcher>>,
) {
  let Ok(transform) = parents.single() else {
    return;
  };
  let pose = global_transform_to_pose(transform);
  if origin.set_if_neq(ArOriginPose(pose)) {
    if let Some(mut dispatcher) = dispatcher {
      dispatcher.set_origin_pose(pose);
    }
  }
}

/// System running one reconciliation tick for kind `D`.
///
/// Entities are spawned and despawned through the manager's lifecycle
/// callbacks; a [`TrackablesUpdated`] message is written when anything changed.
pub fn update_trackables<D: SessionRelativeData>(
  mut commands: Commands,
  mut manager: ResMut<ArManager<D>>,
  mut provider: ResMut<ArProvider<D>>,
  mut entities: ResMut<TrackableEntities<D>>,
  prefab: Option<Res<TrackablePrefab<D>>>,
  origin: Res<ArOriginPose>,
  parents: Query<Entity, With<ArTrackablesParent>>,
  mut updates: MessageWriter<TrackablesUpdated<D>>,
) {
  let parent = parents.single().ok();

  if origin.is_changed() {
    // Trackables outside the trackables parent sit at the root with their
    // world pose, which moves with the origin.
    for (id, _) in manager.set_origin_pose(origin.0) {
      let (Some(trackable), Some(entity)) = (manager.get_trackable(id), entities.get(id)) else {
        continue;
      };
      let transform = trackable_transform(trackable, parent.is_some(), &origin.0);
      commands.entity(entity).try_insert(transform);
    }
  }

  let mut lifecycle = EntityLifecycle {
    commands: &mut commands,
    entities: &mut entities,
    parent,
    origin: origin.0,
    prefab: prefab.as_deref(),
  };
  let provider = provider
    .provider
    .as_deref_mut()
    .map(|p| p as &mut dyn TrackingProvider<D>);
  let summary = manager.update(provider, &mut lifecycle);

  if !summary.is_empty() {
    updates.write(TrackablesUpdated::from(summary));
  }
}

/// System keeping trackables of kind `C` attached to their parent trackables
/// of kind `P` (anchors on planes).
///
/// Every parent some child refers to gets its current world pose pushed into
/// the child manager; children of vanished parents are detached in place.
pub fn sync_attached_trackables<P: SessionRelativeData, C: SessionRelativeData>(
  mut commands: Commands,
  parents: Res<ArManager<P>>,
  mut children: ResMut<ArManager<C>>,
  entities: Res<TrackableEntities<C>>,
  origin: Res<ArOriginPose>,
  trackables_parent: Query<Entity, With<ArTrackablesParent>>,
) {
  let referenced: BTreeSet<TrackableId> = children
    .trackables()
    .iter()
    .filter_map(|t| t.session_relative_data().parent_id())
    .collect();
  if referenced.is_empty() {
    return;
  }

  let mut moved = Vec::new();
  for parent_id in referenced {
    match parents.get_trackable(parent_id) {
      Some(parent) => moved.extend(children.set_parent_trackable_pose(parent_id, parent.world_pose(&origin.0))),
      None => moved.extend(children.clear_parent_trackable(parent_id)),
    }
  }

  let has_parent_entity = trackables_parent.single().is_ok();
  for (id, _) in moved {
    let (Some(trackable), Some(entity)) = (children.get_trackable(id), entities.get(id)) else {
      continue;
    };
    let transform = trackable_transform(trackable, has_parent_entity, &origin.0);
    commands.entity(entity).try_insert(transform);
  }
}
