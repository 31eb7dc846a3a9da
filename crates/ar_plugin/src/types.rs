//! Identity and pose primitives shared by every trackable kind.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use glam::{Quat, Vec3};

// =============================================================================
// TrackableId
// =============================================================================

/// Opaque 128-bit identifier for a tracked entity.
///
/// Assigned by the provider. Ordering and hashing are value based so ids can
/// key any collection.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TrackableId {
  sub_id1: u64,
  sub_id2: u64,
}

impl TrackableId {
  /// Sentinel for "no trackable".
  pub const INVALID: TrackableId = TrackableId {
    sub_id1: 0,
    sub_id2: 0,
  };

  pub const fn new(sub_id1: u64, sub_id2: u64) -> Self {
    Self { sub_id1, sub_id2 }
  }

  pub fn sub_id1(&self) -> u64 {
    self.sub_id1
  }

  pub fn sub_id2(&self) -> u64 {
    self.sub_id2
  }

  #[inline]
  pub fn is_valid(&self) -> bool {
    *self != Self::INVALID
  }
}

impl fmt::Display for TrackableId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:016X}-{:016X}", self.sub_id1, self.sub_id2)
  }
}

// =============================================================================
// Pose
// =============================================================================

/// Position and orientation, expressed in some parent space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
  pub position: Vec3,
  pub rotation: Quat,
}

impl Pose {
  pub const IDENTITY: Pose = Pose {
    position: Vec3::ZERO,
    rotation: Quat::IDENTITY,
  };

  pub fn new(position: Vec3, rotation: Quat) -> Self {
    Self { position, rotation }
  }

  pub fn from_position(position: Vec3) -> Self {
    Self {
      position,
      rotation: Quat::IDENTITY,
    }
  }

  /// Local +Z axis.
  #[inline]
  pub fn forward(&self) -> Vec3 {
    self.rotation * Vec3::Z
  }

  /// Local +X axis.
  #[inline]
  pub fn right(&self) -> Vec3 {
    self.rotation * Vec3::X
  }

  /// Local +Y axis.
  #[inline]
  pub fn up(&self) -> Vec3 {
    self.rotation * Vec3::Y
  }

  /// Map a point from this pose's local space into its parent space.
  #[inline]
  pub fn transform_position(&self, local: Vec3) -> Vec3 {
    self.position + self.rotation * local
  }

  /// Map a point from parent space into this pose's local space.
  #[inline]
  pub fn inverse_transform_position(&self, point: Vec3) -> Vec3 {
    self.rotation.inverse() * (point - self.position)
  }

  /// Lift a pose expressed in this pose's local space into the parent space.
  #[inline]
  pub fn transform_pose(&self, local: &Pose) -> Pose {
    Pose {
      position: self.transform_position(local.position),
      rotation: (self.rotation * local.rotation).normalize(),
    }
  }

  /// Express a parent-space pose in this pose's local space.
  #[inline]
  pub fn inverse_transform_pose(&self, pose: &Pose) -> Pose {
    let inv = self.rotation.inverse();
    Pose {
      position: inv * (pose.position - self.position),
      rotation: (inv * pose.rotation).normalize(),
    }
  }

  pub fn inverse(&self) -> Pose {
    let inv = self.rotation.inverse();
    Pose {
      position: inv * -self.position,
      rotation: inv,
    }
  }

  /// Approximate equality for tests and change detection.
  pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
    self.position.abs_diff_eq(other.position, max_abs_diff)
      && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
        || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
  }
}

impl Default for Pose {
  fn default() -> Self {
    Self::IDENTITY
  }
}

// =============================================================================
// TrackingState
// =============================================================================

/// Quality of tracking for a trackable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TrackingState {
  /// Not tracked. The trackable should not be relied upon.
  #[default]
  None,
  /// Tracked with reduced quality.
  Limited,
  Tracking,
}

impl TrackingState {
  #[inline]
  pub fn is_usable(&self) -> bool {
    !matches!(self, TrackingState::None)
  }
}

// =============================================================================
// TrackableType
// =============================================================================

/// Bitmask of trackable kinds a raycast may hit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TrackableType(u32);

impl TrackableType {
  pub const NONE: TrackableType = TrackableType(0);
  /// Hit inside a plane's boundary polygon.
  pub const PLANE_WITHIN_POLYGON: TrackableType = TrackableType(1 << 0);
  /// Hit inside a plane's rectangular extents.
  pub const PLANE_WITHIN_BOUNDS: TrackableType = TrackableType(1 << 1);
  /// Hit anywhere on a plane's infinite extension.
  pub const PLANE_WITHIN_INFINITY: TrackableType = TrackableType(1 << 2);
  pub const PLANE_ESTIMATED: TrackableType = TrackableType(1 << 3);
  pub const PLANES: TrackableType = TrackableType(0b1111);
  pub const FEATURE_POINT: TrackableType = TrackableType(1 << 4);
  pub const IMAGE: TrackableType = TrackableType(1 << 5);
  pub const FACE: TrackableType = TrackableType(1 << 6);
  pub const DEPTH: TrackableType = TrackableType(1 << 7);
  pub const ENVIRONMENT_MESH: TrackableType = TrackableType(1 << 8);
  pub const BOUNDING_BOX: TrackableType = TrackableType(1 << 9);
  pub const ALL_TYPES: TrackableType = TrackableType((1 << 10) - 1);

  #[inline]
  pub const fn from_bits(bits: u32) -> Self {
    Self(bits & Self::ALL_TYPES.0)
  }

  #[inline]
  pub const fn bits(&self) -> u32 {
    self.0
  }

  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.0 == 0
  }

  /// True when every bit of `other` is set in `self`.
  #[inline]
  pub const fn contains(&self, other: TrackableType) -> bool {
    self.0 & other.0 == other.0
  }

  /// True when `self` and `other` share at least one bit.
  #[inline]
  pub const fn intersects(&self, other: TrackableType) -> bool {
    self.0 & other.0 != 0
  }
}

impl BitOr for TrackableType {
  type Output = Self;
  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl BitOrAssign for TrackableType {
  fn bitor_assign(&mut self, rhs: Self) {
    self.0 |= rhs.0;
  }
}

impl BitAnd for TrackableType {
  type Output = Self;
  fn bitand(self, rhs: Self) -> Self {
    Self(self.0 & rhs.0)
  }
}

impl BitAndAssign for TrackableType {
  fn bitand_assign(&mut self, rhs: Self) {
    self.0 &= rhs.0;
  }
}

impl Not for TrackableType {
  type Output = Self;
  fn not(self) -> Self {
    Self(!self.0 & Self::ALL_TYPES.0)
  }
}

impl fmt::Debug for TrackableType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TrackableType({:#012b})", self.0)
  }
}

// =============================================================================
// TrackableKind
// =============================================================================

/// The family a trackable belongs to. One manager exists per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackableKind {
  Anchor,
  Plane,
  Image,
  Marker,
  BoundingBox,
  EnvironmentProbe,
  Raycast,
}

impl TrackableKind {
  pub fn name(&self) -> &'static str {
    match self {
      TrackableKind::Anchor => "anchor",
      TrackableKind::Plane => "plane",
      TrackableKind::Image => "image",
      TrackableKind::Marker => "marker",
      TrackableKind::BoundingBox => "bounding_box",
      TrackableKind::EnvironmentProbe => "environment_probe",
      TrackableKind::Raycast => "raycast",
    }
  }
}

impl fmt::Display for TrackableKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// =============================================================================
// Ray
// =============================================================================

/// Half-line with a normalized direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
  pub origin: Vec3,
  pub direction: Vec3,
}

impl Ray {
  /// Create a ray; `direction` is normalized (zero stays zero).
  pub fn new(origin: Vec3, direction: Vec3) -> Self {
    Self {
      origin,
      direction: direction.normalize_or_zero(),
    }
  }

  #[inline]
  pub fn point_at(&self, distance: f32) -> Vec3 {
    self.origin + self.direction * distance
  }

  /// Express this ray in the local space of `pose`.
  pub fn to_local(&self, pose: &Pose) -> Ray {
    Ray {
      origin: pose.inverse_transform_position(self.origin),
      direction: pose.rotation.inverse() * self.direction,
    }
  }

  /// Lift a ray in `pose`'s local space into the parent space.
  pub fn to_parent(&self, pose: &Pose) -> Ray {
    Ray {
      origin: pose.transform_position(self.origin),
      direction: pose.rotation * self.direction,
    }
  }

  /// Distance along the ray to the plane through `point` with `normal`.
  ///
  /// Returns `None` when the ray is parallel to the plane or the plane lies
  /// behind the origin.
  pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = normal.dot(self.direction);
    if denom.abs() <= f32::EPSILON {
      return None;
    }
    let distance = (point - self.origin).dot(normal) / denom;
    (distance >= 0.0).then_some(distance)
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
