//! One-shot raycasts against trackables.
//!
//! A query names a mask of trackable types. The part of the mask the provider
//! supports natively goes to the provider; the rest goes to the fallback
//! raycasters registered by the trackable managers. Both result sets are
//! merged, lifted into world space and sorted by distance.
//!
//! ```text
//!            ┌──────── native = mask ∩ supported ──► RaycastProvider ─────┐
//! world ray ─┤                                                            ├─► to world ─► sort
//!            └──────── fallback = mask ∖ native ───► FallbackRaycasters ──┘
//! ```

pub mod bounding_box;
pub mod plane;

use glam::{Vec2, Vec3};
use tracing::{debug, info_span};

use crate::provider::RaycastProvider;
use crate::types::{Pose, Ray, TrackableId, TrackableKind, TrackableType};

// =============================================================================
// Hits
// =============================================================================

/// Session-relative hit produced by a provider or a fallback raycaster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
  pub trackable_id: TrackableId,
  pub pose: Pose,
  /// Distance along the session-space ray.
  pub distance: f32,
  pub hit_type: TrackableType,
}

/// Hit as handed to the application, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArRaycastHit {
  pub trackable_id: TrackableId,
  pub pose: Pose,
  /// Distance from the world-space ray origin.
  pub distance: f32,
  pub hit_type: TrackableType,
  pub session_relative_pose: Pose,
  pub session_relative_distance: f32,
  /// Kind of the trackable that was hit, if a registered manager owns it.
  pub kind: Option<TrackableKind>,
}

// =============================================================================
// Fallback raycasters
// =============================================================================

/// Software raycasting over a manager's own trackables.
pub trait FallbackRaycaster {
  fn kind(&self) -> TrackableKind;

  /// Hit types this raycaster can produce.
  fn raycast_types(&self) -> TrackableType;

  /// Disabled raycasters stay registered for kind resolution but are skipped
  /// during aggregation.
  fn is_fallback_enabled(&self) -> bool;

  /// True if the trackable belongs to this raycaster's manager.
  fn owns(&self, id: TrackableId) -> bool;

  /// Append session-space hits for `ray` restricted to `mask`.
  fn raycast_fallback(&self, ray: &Ray, mask: TrackableType, hits: &mut Vec<RaycastHit>);
}

/// The set of fallback raycasters a query may use, at most one per kind.
#[derive(Default)]
pub struct FallbackRaycasters<'a> {
  raycasters: Vec<&'a dyn FallbackRaycaster>,
}

impl<'a> FallbackRaycasters<'a> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a raycaster, replacing any previous one for the same kind.
  pub fn register(&mut self, raycaster: &'a dyn FallbackRaycaster) {
    let kind = raycaster.kind();
    match self.raycasters.iter_mut().find(|r| r.kind() == kind) {
      Some(slot) => *slot = raycaster,
      None => self.raycasters.push(raycaster),
    }
  }

  pub fn with(mut self, raycaster: &'a dyn FallbackRaycaster) -> Self {
    self.register(raycaster);
    self
  }

  pub fn unregister(&mut self, kind: TrackableKind) -> bool {
    let before = self.raycasters.len();
    self.raycasters.retain(|r| r.kind() != kind);
    self.raycasters.len() != before
  }

  pub fn len(&self) -> usize {
    self.raycasters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.raycasters.is_empty()
  }

  /// Run every enabled raycaster whose types intersect `mask`.
  pub fn raycast(&self, ray: &Ray, mask: TrackableType, hits: &mut Vec<RaycastHit>) {
    for raycaster in &self.raycasters {
      if raycaster.is_fallback_enabled() && raycaster.raycast_types().intersects(mask) {
        raycaster.raycast_fallback(ray, mask, hits);
      }
    }
  }

  /// Kind of the manager owning `id`.
  pub fn resolve_kind(&self, id: TrackableId) -> Option<TrackableKind> {
    self.raycasters.iter().find(|r| r.owns(id)).map(|r| r.kind())
  }
}

// =============================================================================
// Viewport camera
// =============================================================================

/// Pinhole camera used to turn viewport points into session-space rays.
///
/// The camera looks along its local +Z ([`Pose::forward`]) with +X right and
/// +Y up. Viewport points are normalized, `(0, 0)` bottom-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportCamera {
  /// Session-relative camera pose.
  pub pose: Pose,
  /// Vertical field of view in radians.
  pub vertical_fov: f32,
  /// Width over height.
  pub aspect_ratio: f32,
}

impl ViewportCamera {
  pub fn new(pose: Pose, vertical_fov: f32, aspect_ratio: f32) -> Self {
    Self {
      pose,
      vertical_fov,
      aspect_ratio,
    }
  }

  pub fn viewport_point_to_ray(&self, viewport_point: Vec2) -> Ray {
    let ndc = viewport_point * 2.0 - Vec2::ONE;
    let half_height = (self.vertical_fov * 0.5).tan();
    let local = Vec3::new(ndc.x * half_height * self.aspect_ratio, ndc.y * half_height, 1.0);
    Ray::new(self.pose.position, self.pose.rotation * local)
  }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Splits queries between the provider and the fallback raycasters.
#[derive(Default)]
pub struct RaycastDispatcher {
  /// World pose of the trackables parent.
  origin: Pose,
  /// Reused session-space hit buffer.
  scratch: Vec<RaycastHit>,
}

/// Which query flavor the provider is asked to serve.
#[derive(Clone, Copy)]
enum Query<'q> {
  Ray(&'q Ray),
  Viewport(Vec2),
}

impl RaycastDispatcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn origin_pose(&self) -> Pose {
    self.origin
  }

  pub fn set_origin_pose(&mut self, origin: Pose) {
    self.origin = origin;
  }

  /// Raycast along a world-space ray.
  pub fn raycast_ray(
    &mut self,
    ray: &Ray,
    mask: TrackableType,
    provider: Option<&mut dyn RaycastProvider>,
    fallback: &FallbackRaycasters<'_>,
  ) -> Vec<ArRaycastHit> {
    let _span = info_span!("raycast::ray", mask = ?mask).entered();
    let session_ray = ray.to_local(&self.origin);
    self.dispatch(Query::Ray(&session_ray), &session_ray, ray.origin, mask, provider, fallback)
  }

  /// Raycast from a normalized viewport point. `camera` provides the
  /// session-space ray for the fallback path.
  pub fn raycast_viewport(
    &mut self,
    viewport_point: Vec2,
    camera: &ViewportCamera,
    mask: TrackableType,
    provider: Option<&mut dyn RaycastProvider>,
    fallback: &FallbackRaycasters<'_>,
  ) -> Vec<ArRaycastHit> {
    let _span = info_span!("raycast::viewport", mask = ?mask).entered();
    let session_ray = camera.viewport_point_to_ray(viewport_point);
    let world_origin = self.origin.transform_position(session_ray.origin);
    self.dispatch(
      Query::Viewport(viewport_point),
      &session_ray,
      world_origin,
      mask,
      provider,
      fallback,
    )
  }

  fn dispatch(
    &mut self,
    query: Query<'_>,
    session_ray: &Ray,
    world_origin: Vec3,
    mask: TrackableType,
    provider: Option<&mut dyn RaycastProvider>,
    fallback: &FallbackRaycasters<'_>,
  ) -> Vec<ArRaycastHit> {
    self.scratch.clear();

    let provider = provider.filter(|p| {
      p.is_running()
        && match query {
          Query::Ray(_) => p.supports_world_raycast(),
          Query::Viewport(_) => p.supports_viewport_raycast(),
        }
    });
    let native_mask = provider
      .as_ref()
      .map_or(TrackableType::NONE, |p| mask & p.supported_trackable_types());
    let fallback_mask = mask & !native_mask;

    if let Some(provider) = provider {
      if !native_mask.is_empty() {
        match query {
          Query::Ray(ray) => provider.raycast_ray(ray, native_mask, &mut self.scratch),
          Query::Viewport(point) => provider.raycast_viewport(point, native_mask, &mut self.scratch),
        }
      }
    }
    let native_count = self.scratch.len();

    if !fallback_mask.is_empty() {
      fallback.raycast(session_ray, fallback_mask, &mut self.scratch);
    }

    let origin = self.origin;
    let mut hits: Vec<ArRaycastHit> = self
      .scratch
      .iter()
      .map(|hit| {
        let pose = origin.transform_pose(&hit.pose);
        ArRaycastHit {
          trackable_id: hit.trackable_id,
          pose,
          distance: pose.position.distance(world_origin),
          hit_type: hit.hit_type,
          session_relative_pose: hit.pose,
          session_relative_distance: hit.distance,
          kind: fallback.resolve_kind(hit.trackable_id),
        }
      })
      .collect();
    // Stable: equal distances keep native-before-fallback insertion order.
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    debug!(
      native = native_count,
      fallback = self.scratch.len() - native_count,
      "raycast complete"
    );
    hits
  }
}
