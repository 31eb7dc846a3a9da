//! Plane boundary triangulation.
//!
//! Converts a plane's boundary polygon (plane space, `(x, z)` packed into a
//! [`Vec2`]) into a flat triangle mesh lying in the XZ plane with +Y up.
//!
//! Triangulation is ear clipping over a circular doubly-linked list of the
//! unclipped vertices. Only reflex vertices can invalidate an ear, so they are
//! tracked separately and are the only candidates scanned by the ear test:
//! convex polygons clip in O(n), general polygons in O(n·r).
//!
//! Boundaries are expected clockwise when viewed from +Y, as providers report
//! them. Counter-clockwise or self-intersecting input fails instead of looping.

use glam::{Vec2, Vec3};
use tracing::debug;

/// Output buffers for one plane mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneMeshData {
  /// Boundary points lifted to `(x, 0, z)`.
  pub vertices: Vec<Vec3>,
  /// Always `Vec3::Y`, one per vertex.
  pub normals: Vec<Vec3>,
  pub uvs: Vec<Vec2>,
  /// Triangle list, 3 indices per triangle.
  pub indices: Vec<u32>,
}

impl PlaneMeshData {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.normals.clear();
    self.uvs.clear();
    self.indices.clear();
  }

  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  /// Sum of the triangle areas.
  pub fn area(&self) -> f32 {
    self
      .indices
      .chunks_exact(3)
      .map(|tri| {
        let a = self.vertices[tri[0] as usize];
        let b = self.vertices[tri[1] as usize];
        let c = self.vertices[tri[2] as usize];
        (b - a).cross(c - a).length() * 0.5
      })
      .sum()
  }
}

/// Mesh generation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneMeshConfig {
  /// Multiplier applied to plane-space coordinates to produce UVs.
  pub uv_scale: Vec2,
}

impl Default for PlaneMeshConfig {
  fn default() -> Self {
    Self { uv_scale: Vec2::ONE }
  }
}

impl PlaneMeshConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_uv_scale(mut self, uv_scale: Vec2) -> Self {
    self.uv_scale = uv_scale;
    self
  }
}

// =============================================================================
// Mesh generation
// =============================================================================

/// Triangulate `boundary` into `mesh` with default settings.
///
/// Returns false (leaving `mesh` untouched) for fewer than 3 points or when
/// the boundary cannot be ear-clipped.
pub fn try_generate_mesh(boundary: &[Vec2], mesh: &mut PlaneMeshData) -> bool {
  try_generate_mesh_with_config(boundary, &PlaneMeshConfig::default(), mesh)
}

/// Triangulate `boundary` into `mesh`.
pub fn try_generate_mesh_with_config(
  boundary: &[Vec2],
  config: &PlaneMeshConfig,
  mesh: &mut PlaneMeshData,
) -> bool {
  let mut indices = Vec::new();
  if !generate_indices(boundary, &mut indices) {
    return false;
  }

  mesh.clear();
  mesh.indices = indices;
  mesh
    .vertices
    .extend(boundary.iter().map(|p| Vec3::new(p.x, 0.0, p.y)));
  generate_uvs(&mesh.vertices, config.uv_scale, &mut mesh.uvs);
  generate_normals(mesh.vertices.len(), &mut mesh.normals);
  true
}

/// UVs from the vertex `(x, z)` coordinates.
pub fn generate_uvs(vertices: &[Vec3], uv_scale: Vec2, uvs: &mut Vec<Vec2>) {
  uvs.clear();
  uvs.extend(vertices.iter().map(|v| Vec2::new(v.x, v.z) * uv_scale));
}

/// One `+Y` normal per vertex.
pub fn generate_normals(vertex_count: usize, normals: &mut Vec<Vec3>) {
  normals.clear();
  normals.resize(vertex_count, Vec3::Y);
}

// =============================================================================
// Ear clipping
// =============================================================================

/// Ear-clip a clockwise boundary into `indices` (replacing its contents).
///
/// Emits exactly `n - 2` triangles on success, each as
/// `(ear, next, previous)`. On failure `indices` is left unmodified.
pub fn generate_indices(boundary: &[Vec2], indices: &mut Vec<u32>) -> bool {
  let n = boundary.len();
  if n < 3 {
    debug!(points = n, "plane boundary has fewer than 3 points");
    return false;
  }

  // Circular doubly-linked list over the unclipped vertices.
  let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
  let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
  let mut reflex = ReflexSet::new(n);
  for i in 0..n {
    if is_reflex(boundary[prev[i]], boundary[i], boundary[next[i]]) {
      reflex.insert(i);
    }
  }

  let mut triangles = Vec::with_capacity((n - 2) * 3);
  let mut remaining = n;
  let mut current = 0;
  // Consecutive candidates rejected since the last clip.
  let mut rejected = 0;

  while remaining > 2 {
    if rejected >= remaining {
      debug!(
        points = n,
        remaining, "no ear found, boundary is not a clockwise simple polygon"
      );
      return false;
    }

    let before = prev[current];
    let after = next[current];

    if reflex.contains(current) || reflex.any_inside(boundary, before, current, after) {
      current = after;
      rejected += 1;
      continue;
    }

    triangles.extend_from_slice(&[current as u32, after as u32, before as u32]);

    next[before] = after;
    prev[after] = before;
    remaining -= 1;

    reflex.set(before, is_reflex(boundary[prev[before]], boundary[before], boundary[after]));
    reflex.set(after, is_reflex(boundary[before], boundary[after], boundary[next[after]]));

    current = after;
    rejected = 0;
  }

  indices.clear();
  indices.extend(triangles);
  true
}

/// Reflex vertices of the unclipped polygon, with O(1) membership.
struct ReflexSet {
  flags: Vec<bool>,
  members: Vec<usize>,
}

impl ReflexSet {
  fn new(n: usize) -> Self {
    Self {
      flags: vec![false; n],
      members: Vec::new(),
    }
  }

  #[inline]
  fn contains(&self, vertex: usize) -> bool {
    self.flags[vertex]
  }

  fn insert(&mut self, vertex: usize) {
    if !self.flags[vertex] {
      self.flags[vertex] = true;
      self.members.push(vertex);
    }
  }

  fn set(&mut self, vertex: usize, reflex: bool) {
    if reflex {
      self.insert(vertex);
    } else if self.flags[vertex] {
      self.flags[vertex] = false;
      if let Some(pos) = self.members.iter().position(|&v| v == vertex) {
        self.members.swap_remove(pos);
      }
    }
  }

  /// True if a reflex vertex other than the ear's corners lies inside the
  /// ear `(before, ear, after)`.
  fn any_inside(&self, boundary: &[Vec2], before: usize, ear: usize, after: usize) -> bool {
    let (a, b, c) = (boundary[before], boundary[ear], boundary[after]);
    self
      .members
      .iter()
      .filter(|&&v| v != before && v != ear && v != after)
      .any(|&v| point_in_triangle(boundary[v], a, b, c))
  }
}

/// 2D cross product of `a` and `b`.
#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
  a.x * b.y - a.y * b.x
}

/// Reflex for a clockwise polygon: a left turn (or no turn) at `current`.
/// Collinear vertices count as reflex so they never become an ear apex.
#[inline]
fn is_reflex(previous: Vec2, current: Vec2, next: Vec2) -> bool {
  cross(current - previous, next - current) >= 0.0
}

/// Inclusive point-in-triangle test (points on an edge count as inside).
#[inline]
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
  let d1 = cross(b - a, p - a);
  let d2 = cross(c - b, p - b);
  let d3 = cross(a - c, p - c);
  let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
  let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
  !(has_negative && has_positive)
}

#[cfg(test)]
#[path = "plane_mesh_test.rs"]
mod plane_mesh_test;
