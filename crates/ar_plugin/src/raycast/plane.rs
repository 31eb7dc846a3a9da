//! Fallback plane raycasts for providers without native plane hits.

use glam::Vec2;

use super::{FallbackRaycaster, RaycastHit};
use crate::kinds::BoundedPlane;
use crate::manager::TrackableManager;
use crate::trackable::SessionRelativeData;
use crate::types::{Pose, Ray, TrackableId, TrackableKind, TrackableType};

/// Hit `ray` against one plane. The reported type is the most specific of
/// polygon, bounds and infinity that `mask` allows.
pub fn raycast_plane(ray: &Ray, plane: &BoundedPlane, mask: TrackableType) -> Option<RaycastHit> {
  let distance = ray.intersect_plane(plane.center.position, plane.normal())?;
  let position = ray.point_at(distance);
  let local = plane.center.inverse_transform_position(position);
  let point = Vec2::new(local.x, local.z);

  let hit_type = if mask.contains(TrackableType::PLANE_WITHIN_POLYGON) && plane.within_polygon(point) {
    TrackableType::PLANE_WITHIN_POLYGON
  } else if mask.contains(TrackableType::PLANE_WITHIN_BOUNDS) && plane.within_bounds(point) {
    TrackableType::PLANE_WITHIN_BOUNDS
  } else if mask.contains(TrackableType::PLANE_WITHIN_INFINITY) {
    TrackableType::PLANE_WITHIN_INFINITY
  } else {
    return None;
  };

  Some(RaycastHit {
    trackable_id: plane.trackable_id,
    pose: Pose::new(position, plane.center.rotation),
    distance,
    hit_type,
  })
}

impl FallbackRaycaster for TrackableManager<BoundedPlane> {
  fn kind(&self) -> TrackableKind {
    BoundedPlane::KIND
  }

  fn raycast_types(&self) -> TrackableType {
    TrackableType::PLANE_WITHIN_POLYGON
      | TrackableType::PLANE_WITHIN_BOUNDS
      | TrackableType::PLANE_WITHIN_INFINITY
  }

  fn is_fallback_enabled(&self) -> bool {
    self.is_enabled() && self.config().fallback_raycasting
  }

  fn owns(&self, id: TrackableId) -> bool {
    self.trackables().contains(id)
  }

  fn raycast_fallback(&self, ray: &Ray, mask: TrackableType, hits: &mut Vec<RaycastHit>) {
    // Subsumed planes are covered by the plane that absorbed them.
    hits.extend(
      self
        .trackables()
        .iter()
        .map(|t| t.session_relative_data())
        .filter(|plane| plane.subsumed_by.is_none())
        .filter_map(|plane| raycast_plane(ray, plane, mask)),
    );
  }
}
