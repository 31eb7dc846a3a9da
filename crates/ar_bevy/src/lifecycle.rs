//! Entity-backed [`TrackableLifecycle`] over [`Commands`].

use ar_plugin::{ParentSpace, Pose, SessionRelativeData, Trackable, TrackableLifecycle};
use bevy::prelude::*;

use crate::components::ArTrackable;
use crate::resources::{TrackableEntities, TrackablePrefab};

/// Transform for a trackable's entity.
///
/// Trackables under the trackables parent become its children and use their
/// session pose. Trackables attached to another trackable are children too,
/// posed in session space from their parent trackable's pose. Everything else
/// is spawned at the root with its world pose.
pub fn trackable_transform<D: SessionRelativeData>(
  trackable: &Trackable<D>,
  has_parent_entity: bool,
  origin: &Pose,
) -> Transform {
  let placement = trackable.placement();
  let pose = match placement.parent {
    ParentSpace::TrackablesParent if has_parent_entity => placement.local_pose,
    ParentSpace::Trackable { .. } if has_parent_entity => {
      origin.inverse_transform_pose(&trackable.world_pose(origin))
    }
    _ => trackable.world_pose(origin),
  };
  pose_to_transform(&pose)
}

/// Whether the entity for `parent` lives under the trackables parent entity.
pub fn under_trackables_parent(parent: ParentSpace) -> bool {
  matches!(parent, ParentSpace::TrackablesParent | ParentSpace::Trackable { .. })
}

pub fn pose_to_transform(pose: &Pose) -> Transform {
  Transform::from_translation(pose.position).with_rotation(pose.rotation)
}

pub fn global_transform_to_pose(transform: &GlobalTransform) -> Pose {
  let (_, rotation, translation) = transform.to_scale_rotation_translation();
  Pose::new(translation, rotation)
}

/// Spawns, updates and despawns the entities backing trackables of kind `D`.
pub struct EntityLifecycle<'a, 'w, 's, D: SessionRelativeData> {
  pub commands: &'a mut Commands<'w, 's>,
  pub entities: &'a mut TrackableEntities<D>,
  /// The [`ArTrackablesParent`](crate::ArTrackablesParent) entity, if any.
  pub parent: Option<Entity>,
  pub origin: Pose,
  pub prefab: Option<&'a TrackablePrefab<D>>,
}

impl<D: SessionRelativeData> TrackableLifecycle<D> for EntityLifecycle<'_, '_, '_, D> {
  fn on_created(&mut self, trackable: &Trackable<D>) {
    let transform = trackable_transform(trackable, self.parent.is_some(), &self.origin);
    let mut entity = self.commands.spawn(Name::new(D::KIND.name()));
    if let Some(prefab) = self.prefab {
      prefab.apply(&mut entity, trackable);
    }
    entity.insert((ArTrackable::from(trackable), transform));
    if let Some(parent) = self.parent.filter(|_| under_trackables_parent(trackable.placement().parent)) {
      entity.insert(ChildOf(parent));
    }
    self.entities.insert(trackable.trackable_id(), entity.id());
  }

  fn on_updated(&mut self, trackable: &Trackable<D>) {
    let Some(entity) = self.entities.get(trackable.trackable_id()) else {
      return;
    };
    let transform = trackable_transform(trackable, self.parent.is_some(), &self.origin);
    self
      .commands
      .entity(entity)
      .try_insert((ArTrackable::from(trackable), transform));
  }

  fn destroy(&mut self, trackable: Trackable<D>) {
    if let Some(entity) = self.entities.remove(trackable.trackable_id()) {
      self.commands.entity(entity).try_despawn();
    }
  }

  fn release(&mut self, trackable: Trackable<D>) {
    if let Some(entity) = self.entities.remove(trackable.trackable_id()) {
      self.commands.entity(entity).try_remove::<ArTrackable>();
    }
  }
}
