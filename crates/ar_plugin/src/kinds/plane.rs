//! Bounded planes detected on real-world surfaces.

use glam::{Vec2, Vec3};

use crate::trackable::SessionRelativeData;
use crate::types::{Pose, TrackableId, TrackableKind, TrackingState};

/// Orientation of a plane relative to gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PlaneAlignment {
  #[default]
  None,
  /// Horizontal, facing up (floors, tables).
  HorizontalUp,
  /// Horizontal, facing down (ceilings).
  HorizontalDown,
  Vertical,
  NotAxisAligned,
}

impl PlaneAlignment {
  pub fn is_horizontal(&self) -> bool {
    matches!(self, PlaneAlignment::HorizontalUp | PlaneAlignment::HorizontalDown)
  }
}

/// Semantic label some providers attach to planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PlaneClassification {
  #[default]
  None,
  Wall,
  Floor,
  Ceiling,
  Table,
  Seat,
  Door,
  Window,
}

/// Session-relative plane record.
///
/// The plane lies in the XZ plane of `center`; its normal is the pose's +Y.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedPlane {
  pub trackable_id: TrackableId,
  /// Plane that absorbed this one, if any.
  pub subsumed_by: Option<TrackableId>,
  pub center: Pose,
  /// Full width (X) and depth (Z) of the bounding rectangle.
  pub size: Vec2,
  pub alignment: PlaneAlignment,
  pub classification: PlaneClassification,
  pub tracking_state: TrackingState,
  pub native_ptr: usize,
  /// Clockwise boundary in plane space (x, z).
  pub boundary: Vec<Vec2>,
}

impl BoundedPlane {
  pub fn new(trackable_id: TrackableId, center: Pose, size: Vec2) -> Self {
    let half = size * 0.5;
    Self {
      trackable_id,
      subsumed_by: None,
      center,
      size,
      alignment: PlaneAlignment::HorizontalUp,
      classification: PlaneClassification::None,
      tracking_state: TrackingState::Tracking,
      native_ptr: 0,
      boundary: vec![
        Vec2::new(-half.x, -half.y),
        Vec2::new(-half.x, half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(half.x, -half.y),
      ],
    }
  }

  pub fn with_boundary(mut self, boundary: Vec<Vec2>) -> Self {
    self.boundary = boundary;
    self
  }

  pub fn with_alignment(mut self, alignment: PlaneAlignment) -> Self {
    self.alignment = alignment;
    self
  }

  /// Plane normal in session space.
  #[inline]
  pub fn normal(&self) -> Vec3 {
    self.center.up()
  }

  /// Half of [`size`](Self::size).
  #[inline]
  pub fn extents(&self) -> Vec2 {
    self.size * 0.5
  }

  /// Area enclosed by the boundary polygon.
  pub fn area(&self) -> f32 {
    polygon_area(&self.boundary)
  }

  /// True if a plane-space point lies inside the rectangular extents.
  pub fn within_bounds(&self, point: Vec2) -> bool {
    let extents = self.extents();
    point.x.abs() <= extents.x && point.y.abs() <= extents.y
  }

  /// True if a plane-space point lies inside the boundary polygon.
  pub fn within_polygon(&self, point: Vec2) -> bool {
    point_in_polygon(point, &self.boundary)
  }
}

impl SessionRelativeData for BoundedPlane {
  const KIND: TrackableKind = TrackableKind::Plane;

  fn trackable_id(&self) -> TrackableId {
    self.trackable_id
  }

  fn pose(&self) -> Pose {
    self.center
  }

  fn tracking_state(&self) -> TrackingState {
    self.tracking_state
  }

  fn native_ptr(&self) -> usize {
    self.native_ptr
  }
}

/// Unsigned shoelace area.
pub fn polygon_area(points: &[Vec2]) -> f32 {
  if points.len() < 3 {
    return 0.0;
  }
  let mut twice_area = 0.0;
  for (i, a) in points.iter().enumerate() {
    let b = points[(i + 1) % points.len()];
    twice_area += a.x * b.y - b.x * a.y;
  }
  (twice_area * 0.5).abs()
}

/// Even-odd crossing test.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
  if polygon.len() < 3 {
    return false;
  }
  let mut inside = false;
  let mut j = polygon.len() - 1;
  for i in 0..polygon.len() {
    let a = polygon[i];
    let b = polygon[j];
    if (a.y > point.y) != (b.y > point.y) {
      let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
      if point.x < x_cross {
        inside = !inside;
      }
    }
    j = i;
  }
  inside
}
