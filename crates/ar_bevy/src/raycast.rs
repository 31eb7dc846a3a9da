//! Raycasts against trackables from Bevy systems.

use ar_plugin::{
  ArRaycastHit, BoundedPlane, BoundingBox, FallbackRaycasters, Ray, RaycastProvider,
  TrackableKind, TrackableType, ViewportCamera,
};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::resources::{ArManager, ArRaycastDispatcher, ArRaycastProvider, TrackableEntities};

/// System parameter bundling everything a raycast query needs.
///
/// # Example
/// ```ignore
/// fn place_on_tap(camera: Single<(&Camera, &GlobalTransform)>, mut ar: ArRaycast) {
///     let (camera, transform) = *camera;
///     let Ok(ray) = camera.viewport_to_world(transform, cursor) else { return };
///     if let Some(hit) = ar.raycast(ray, TrackableType::PLANES).first() {
///         // ...
///     }
/// }
/// ```
#[derive(SystemParam)]
pub struct ArRaycast<'w> {
  planes: Option<Res<'w, ArManager<BoundedPlane>>>,
  boxes: Option<Res<'w, ArManager<BoundingBox>>>,
  dispatcher: ResMut<'w, ArRaycastDispatcher>,
  provider: Option<ResMut<'w, ArRaycastProvider>>,
  plane_entities: Option<Res<'w, TrackableEntities<BoundedPlane>>>,
  box_entities: Option<Res<'w, TrackableEntities<BoundingBox>>>,
}

impl ArRaycast<'_> {
  /// Raycast along a world-space ray, closest hit first.
  pub fn raycast(&mut self, ray: Ray3d, mask: TrackableType) -> Vec<ArRaycastHit> {
    let ray = Ray::new(ray.origin, *ray.direction);
    let fallback = fallback_raycasters(self.planes.as_deref(), self.boxes.as_deref());
    let provider = self
      .provider
      .as_mut()
      .and_then(|p| p.provider.as_deref_mut())
      .map(|p| p as &mut dyn RaycastProvider);
    self.dispatcher.raycast_ray(&ray, mask, provider, &fallback)
  }

  /// Raycast from a normalized viewport point (`(0, 0)` bottom-left).
  /// `camera` is the session-relative AR camera.
  pub fn raycast_viewport(
    &mut self,
    viewport_point: Vec2,
    camera: &ViewportCamera,
    mask: TrackableType,
  ) -> Vec<ArRaycastHit> {
    let fallback = fallback_raycasters(self.planes.as_deref(), self.boxes.as_deref());
    let provider = self
      .provider
      .as_mut()
      .and_then(|p| p.provider.as_deref_mut())
      .map(|p| p as &mut dyn RaycastProvider);
    self
      .dispatcher
      .raycast_viewport(viewport_point, camera, mask, provider, &fallback)
  }

  /// Entity backing the trackable a hit landed on. `None` for hits on
  /// features no manager owns (feature points, depth).
  pub fn hit_entity(&self, hit: &ArRaycastHit) -> Option<Entity> {
    match hit.kind? {
      TrackableKind::Plane => self.plane_entities.as_ref()?.get(hit.trackable_id),
      TrackableKind::BoundingBox => self.box_entities.as_ref()?.get(hit.trackable_id),
      _ => None,
    }
  }
}

fn fallback_raycasters<'a>(
  planes: Option<&'a ArManager<BoundedPlane>>,
  boxes: Option<&'a ArManager<BoundingBox>>,
) -> FallbackRaycasters<'a> {
  let mut fallback = FallbackRaycasters::new();
  if let Some(planes) = planes {
    fallback.register(&planes.0);
  }
  if let Some(boxes) = boxes {
    fallback.register(&boxes.0);
  }
  fallback
}
