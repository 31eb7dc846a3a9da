//! Ray tests against oriented bounding boxes, one plane test per face.
//!
//! Each face reports its own canonical orientation: the hit pose's up axis is
//! the face's outward normal, so content placed on a hit sits on the face.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use super::{FallbackRaycaster, RaycastHit};
use crate::kinds::BoundingBox;
use crate::manager::TrackableManager;
use crate::trackable::SessionRelativeData;
use crate::types::{Pose, Ray, TrackableId, TrackableKind, TrackableType};

/// A ray enters a convex box through at most this many faces before the box
/// stops being tested. Exit faces do not count toward the cap.
const MAX_ENTRY_HITS: usize = 2;

/// Slack on the face bounds check.
const BOUNDS_EPSILON: f32 = 1e-5;

/// Box face in local space: axis index and outward sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
  pub axis: usize,
  pub positive: bool,
}

impl Face {
  pub const ALL: [Face; 6] = [
    Face::new(0, true),
    Face::new(0, false),
    Face::new(1, true),
    Face::new(1, false),
    Face::new(2, true),
    Face::new(2, false),
  ];

  const fn new(axis: usize, positive: bool) -> Self {
    Self { axis, positive }
  }

  /// Outward normal in box space.
  pub fn local_normal(&self) -> Vec3 {
    let sign = if self.positive { 1.0 } else { -1.0 };
    Vec3::AXES[self.axis] * sign
  }

  /// Rotation taking box-space +Y onto this face's normal.
  pub fn rotation(&self) -> Quat {
    match (self.axis, self.positive) {
      (0, true) => Quat::from_rotation_z(-FRAC_PI_2),
      (0, false) => Quat::from_rotation_z(FRAC_PI_2),
      (1, true) => Quat::IDENTITY,
      (1, false) => Quat::from_rotation_x(PI),
      (2, true) => Quat::from_rotation_x(FRAC_PI_2),
      _ => Quat::from_rotation_x(-FRAC_PI_2),
    }
  }

  /// The two axes spanning the face.
  fn tangent_axes(&self) -> [usize; 2] {
    [(self.axis + 1) % 3, (self.axis + 2) % 3]
  }
}

/// Closest face hit of `ray` against one box, or `None`.
///
/// `center` is the box pose and `half_extents` its half size per local axis.
pub fn raycast_box(ray: &Ray, center: &Pose, half_extents: Vec3) -> Option<(f32, Pose)> {
  let mut face_hits: SmallVec<[(f32, Face, Vec3); 6]> = SmallVec::new();
  let mut entry_hits = 0;

  for face in Face::ALL {
    let normal = center.rotation * face.local_normal();
    let plane_point = center.position + normal * half_extents[face.axis];
    let Some(distance) = ray.intersect_plane(plane_point, normal) else {
      continue;
    };

    let position = ray.point_at(distance);
    let local = center.inverse_transform_position(position);
    let within = face
      .tangent_axes()
      .iter()
      .all(|&axis| local[axis].abs() <= half_extents[axis] + BOUNDS_EPSILON);
    if !within {
      continue;
    }

    face_hits.push((distance, face, position));
    if normal.dot(ray.direction) < 0.0 {
      entry_hits += 1;
      if entry_hits == MAX_ENTRY_HITS {
        break;
      }
    }
  }

  // First minimum wins on ties (edge and corner hits).
  let (distance, face, position) = face_hits
    .into_iter()
    .min_by(|a, b| a.0.total_cmp(&b.0))?;
  let rotation = (center.rotation * face.rotation()).normalize();
  Some((distance, Pose::new(position, rotation)))
}

/// Append at most one hit per box, the closest face the ray meets.
pub fn raycast<'a, I>(ray: &Ray, boxes: I, hits: &mut Vec<RaycastHit>)
where
  I: IntoIterator<Item = &'a BoundingBox>,
{
  for bbox in boxes {
    if let Some((distance, pose)) = raycast_box(ray, &bbox.pose, bbox.half_extents()) {
      hits.push(RaycastHit {
        trackable_id: bbox.trackable_id,
        pose,
        distance,
        hit_type: TrackableType::BOUNDING_BOX,
      });
    }
  }
}

impl FallbackRaycaster for TrackableManager<BoundingBox> {
  fn kind(&self) -> TrackableKind {
    BoundingBox::KIND
  }

  fn raycast_types(&self) -> TrackableType {
    TrackableType::BOUNDING_BOX
  }

  fn is_fallback_enabled(&self) -> bool {
    self.is_enabled() && self.config().fallback_raycasting
  }

  fn owns(&self, id: TrackableId) -> bool {
    self.trackables().contains(id)
  }

  fn raycast_fallback(&self, ray: &Ray, mask: TrackableType, hits: &mut Vec<RaycastHit>) {
    if !mask.intersects(TrackableType::BOUNDING_BOX) {
      return;
    }
    raycast(
      ray,
      self.trackables().iter().map(|t| t.session_relative_data()),
      hits,
    );
  }
}

#[cfg(test)]
#[path = "bounding_box_test.rs"]
mod bounding_box_test;
