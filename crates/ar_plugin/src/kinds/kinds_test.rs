use glam::{Quat, Vec2, Vec3};

use super::*;
use crate::error::ArError;
use crate::lifecycle::NullLifecycle;
use crate::manager::{TrackableManager, TrackableManagerConfig};
use crate::provider::{
  AnchorProvider, EnvironmentProbeProvider, ManualPlacementProvider, RaycastTrackingProvider,
  TrackableChanges, TrackingProvider,
};
use crate::trackable::{ParentSpace, SessionRelativeData};
use crate::types::{Pose, TrackableId, TrackableKind, TrackableType, TrackingState};

/// Accepts every placement request and remembers the last session pose.
#[derive(Default)]
struct AcceptingProvider {
  stopped: bool,
  next: u64,
  last_pose: Option<Pose>,
  last_parent: Option<TrackableId>,
}

impl AcceptingProvider {
  fn next_id(&mut self) -> TrackableId {
    self.next += 1;
    TrackableId::new(7, self.next)
  }
}

macro_rules! accepting_provider_for {
  ($kind:ty, $make:expr) => {
    impl TrackingProvider<$kind> for AcceptingProvider {
      fn is_running(&self) -> bool {
        !self.stopped
      }

      fn get_changes(&mut self, _changes: &mut TrackableChanges<$kind>) {}
    }

    impl ManualPlacementProvider<$kind> for AcceptingProvider {
      fn try_add(&mut self, pose: Pose) -> Option<$kind> {
        self.last_pose = Some(pose);
        let id = self.next_id();
        Some($make(id, pose))
      }

      fn try_remove(&mut self, _id: TrackableId) -> bool {
        true
      }
    }
  };
}

fn make_anchor(id: TrackableId, pose: Pose) -> Anchor {
  Anchor::new(id, pose, TrackingState::Limited)
}

fn make_probe(id: TrackableId, pose: Pose) -> EnvironmentProbe {
  EnvironmentProbe::new(id, pose, ProbePlacement::Manual)
}

fn make_raycast(id: TrackableId, pose: Pose) -> TrackedRaycast {
  TrackedRaycast::new(id, pose, 1.0)
}

accepting_provider_for!(Anchor, make_anchor);
accepting_provider_for!(EnvironmentProbe, make_probe);
accepting_provider_for!(TrackedRaycast, make_raycast);

impl AnchorProvider for AcceptingProvider {
  fn try_attach_anchor(&mut self, parent_id: TrackableId, pose: Pose) -> Option<Anchor> {
    self.last_pose = Some(pose);
    self.last_parent = Some(parent_id);
    let id = self.next_id();
    Some(Anchor::new(id, pose, TrackingState::Limited).with_parent(parent_id))
  }
}

impl EnvironmentProbeProvider for AcceptingProvider {
  fn try_add_environment_probe(
    &mut self,
    pose: Pose,
    scale: Vec3,
    size: Vec3,
  ) -> Option<EnvironmentProbe> {
    self.last_pose = Some(pose);
    let id = self.next_id();
    let mut probe = EnvironmentProbe::new(id, pose, ProbePlacement::Manual);
    probe.scale = scale;
    probe.size = size;
    Some(probe)
  }
}

impl RaycastTrackingProvider for AcceptingProvider {
  fn try_add_raycast(&mut self, viewport_point: Vec2, estimated_distance: f32) -> Option<TrackedRaycast> {
    let id = self.next_id();
    let pose = Pose::from_position(Vec3::new(viewport_point.x, viewport_point.y, -estimated_distance));
    let mut raycast = TrackedRaycast::new(id, pose, estimated_distance);
    raycast.hit_type = TrackableType::PLANE_ESTIMATED;
    Some(raycast)
  }
}

// Plane geometry
#[test]
fn test_plane_default_boundary_is_clockwise_rectangle() {
  let plane = BoundedPlane::new(TrackableId::new(0, 1), Pose::IDENTITY, Vec2::new(2.0, 4.0));
  assert_eq!(plane.boundary.len(), 4);
  assert!((plane.area() - 8.0).abs() < 1e-6);

  // Clockwise polygons have a negative signed shoelace sum.
  let signed: f32 = plane
    .boundary
    .iter()
    .zip(plane.boundary.iter().cycle().skip(1))
    .map(|(a, b)| a.x * b.y - b.x * a.y)
    .sum();
  assert!(signed < 0.0);
}

#[test]
fn test_plane_containment() {
  let l_shape = vec![
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 2.0),
    Vec2::new(1.0, 2.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(2.0, 1.0),
    Vec2::new(2.0, 0.0),
  ];
  let plane = BoundedPlane::new(TrackableId::new(0, 1), Pose::IDENTITY, Vec2::new(4.0, 4.0))
    .with_boundary(l_shape);

  assert!(plane.within_polygon(Vec2::new(0.5, 1.5)));
  assert!(!plane.within_polygon(Vec2::new(1.5, 1.5)));
  assert!(plane.within_bounds(Vec2::new(1.5, 1.5)));
  assert!(!plane.within_bounds(Vec2::new(2.5, 0.0)));
  assert!((plane.area() - 3.0).abs() < 1e-6);
}

#[test]
fn test_plane_normal_follows_center_rotation() {
  let center = Pose::new(Vec3::ZERO, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2));
  let plane = BoundedPlane::new(TrackableId::new(0, 1), center, Vec2::ONE)
    .with_alignment(PlaneAlignment::Vertical);
  assert!(plane.normal().abs_diff_eq(Vec3::Z, 1e-5));
  assert!(!plane.alignment.is_horizontal());
  assert_eq!(plane.pose(), center);
}

#[test]
fn test_polygon_helpers_with_degenerate_input() {
  assert_eq!(plane::polygon_area(&[Vec2::ZERO, Vec2::ONE]), 0.0);
  assert!(!plane::point_in_polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::ONE]));
}

// Session data contract
#[test]
fn test_kind_constants() {
  assert_eq!(Anchor::KIND, TrackableKind::Anchor);
  assert_eq!(BoundedPlane::KIND, TrackableKind::Plane);
  assert_eq!(TrackedImage::KIND, TrackableKind::Image);
  assert_eq!(Marker::KIND, TrackableKind::Marker);
  assert_eq!(BoundingBox::KIND, TrackableKind::BoundingBox);
  assert_eq!(EnvironmentProbe::KIND, TrackableKind::EnvironmentProbe);
  assert_eq!(TrackedRaycast::KIND, TrackableKind::Raycast);
}

#[test]
fn test_automatic_placement_flag() {
  let id = TrackableId::new(0, 1);
  let manual = EnvironmentProbe::new(id, Pose::IDENTITY, ProbePlacement::Manual);
  let automatic = EnvironmentProbe::new(id, Pose::IDENTITY, ProbePlacement::Automatic);
  assert!(!manual.is_automatically_placed());
  assert!(automatic.is_automatically_placed());
  assert!(!Anchor::new(id, Pose::IDENTITY, TrackingState::Tracking).is_automatically_placed());
}

#[test]
fn test_record_extents() {
  let id = TrackableId::new(0, 1);
  let bbox = BoundingBox::new(id, Pose::IDENTITY, Vec3::new(2.0, 1.0, 4.0));
  assert_eq!(bbox.half_extents(), Vec3::new(1.0, 0.5, 2.0));

  let image = TrackedImage::new(id, 3, Pose::IDENTITY, Vec2::new(0.2, 0.1));
  assert_eq!(image.extents(), Vec2::new(0.1, 0.05));

  let mut marker = Marker::new(id, Pose::IDENTITY, MarkerType::QrCode);
  marker.data = Some("https://example.com".to_string());
  assert_eq!(marker.marker_type, MarkerType::QrCode);
  assert_eq!(marker.data.as_deref(), Some("https://example.com"));
}

// Kind-specific placement
#[test]
fn test_attach_anchor_converts_world_pose() {
  let mut manager = TrackableManager::<Anchor>::default();
  let mut provider = AcceptingProvider::default();
  let origin = Pose::from_position(Vec3::new(0.0, 1.5, 0.0));
  manager.set_origin_pose(origin);

  let plane_id = TrackableId::new(1, 1);
  let world = Pose::from_position(Vec3::new(2.0, 1.5, 0.0));
  let anchor_id = manager
    .attach_anchor(&mut provider, &mut NullLifecycle, plane_id, world)
    .unwrap()
    .unwrap();

  let session = provider.last_pose.unwrap();
  assert!(session.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
  assert_eq!(provider.last_parent, Some(plane_id));

  let anchor = manager.get_trackable(anchor_id).unwrap();
  assert!(anchor.pending());
  assert_eq!(anchor.session_relative_data().parent_id(), Some(plane_id));
  assert!(anchor.world_pose(&origin).abs_diff_eq(&world, 1e-5));
}

#[test]
fn test_attach_anchor_rejects_invalid_parent() {
  let mut manager = TrackableManager::<Anchor>::default();
  let mut provider = AcceptingProvider::default();
  let result = manager.attach_anchor(&mut provider, &mut NullLifecycle, TrackableId::INVALID, Pose::IDENTITY);
  assert!(matches!(result, Err(ArError::InvalidArgument(_))));
  assert!(manager.trackables().is_empty());
}

#[test]
fn test_attached_anchor_follows_its_plane() {
  let mut manager = TrackableManager::<Anchor>::default();
  let plane_id = TrackableId::new(1, 1);
  let plane_world = Pose::new(Vec3::new(0.0, 0.0, -2.0), Quat::from_rotation_y(0.4));
  assert!(manager.set_parent_trackable_pose(plane_id, plane_world).is_empty());

  let anchor_world = Pose::from_position(Vec3::new(0.5, 0.0, -2.0));
  let anchor = Anchor::new(TrackableId::new(7, 1), anchor_world, TrackingState::Tracking).with_parent(plane_id);
  let anchor_id = manager.create_trackable_immediate(anchor, &mut NullLifecycle).trackable_id();

  let placement = *manager.get_trackable(anchor_id).unwrap().placement();
  assert_eq!(placement.parent, ParentSpace::Trackable { id: plane_id, world: plane_world });
  assert!(plane_world.transform_pose(&placement.local_pose).abs_diff_eq(&anchor_world, 1e-5));

  // The plane moves; the anchor keeps its offset on the plane.
  let delta = Pose::new(Vec3::new(1.0, 0.5, 0.0), Quat::from_rotation_y(-0.3));
  let moved_plane = delta.transform_pose(&plane_world);
  let moved = manager.set_parent_trackable_pose(plane_id, moved_plane);
  assert_eq!(moved, vec![(anchor_id, placement.local_pose)]);

  let origin = manager.origin_pose();
  let world = manager.get_trackable(anchor_id).unwrap().world_pose(&origin);
  assert!(world.abs_diff_eq(&delta.transform_pose(&anchor_world), 1e-4));

  // Same pose again is a no-op.
  assert!(manager.set_parent_trackable_pose(plane_id, moved_plane).is_empty());
}

#[test]
fn test_anchor_attaches_once_parent_pose_is_known() {
  let mut manager = TrackableManager::<Anchor>::default();
  let plane_id = TrackableId::new(1, 1);
  let anchor_world = Pose::from_position(Vec3::new(0.0, 1.0, 0.0));
  let anchor = Anchor::new(TrackableId::new(7, 1), anchor_world, TrackingState::Tracking).with_parent(plane_id);
  let anchor_id = manager.create_trackable_immediate(anchor, &mut NullLifecycle).trackable_id();
  assert_eq!(
    manager.get_trackable(anchor_id).unwrap().placement().parent,
    ParentSpace::TrackablesParent
  );

  // Unrelated parents leave it alone.
  assert!(manager.set_parent_trackable_pose(TrackableId::new(1, 2), Pose::IDENTITY).is_empty());

  let plane_world = Pose::from_position(Vec3::new(0.0, 0.0, 3.0));
  let moved = manager.set_parent_trackable_pose(plane_id, plane_world);
  assert_eq!(moved.len(), 1);
  let trackable = manager.get_trackable(anchor_id).unwrap();
  assert!(matches!(trackable.placement().parent, ParentSpace::Trackable { id, .. } if id == plane_id));
  assert!(trackable.world_pose(&Pose::IDENTITY).abs_diff_eq(&anchor_world, 1e-5));

  // Losing the plane detaches the anchor in place.
  let detached = manager.clear_parent_trackable(plane_id);
  assert_eq!(detached.len(), 1);
  let trackable = manager.get_trackable(anchor_id).unwrap();
  assert_eq!(trackable.placement().parent, ParentSpace::TrackablesParent);
  assert!(trackable.world_pose(&Pose::IDENTITY).abs_diff_eq(&anchor_world, 1e-5));
  assert_eq!(manager.parent_trackable_pose(plane_id), None);
  assert!(manager.clear_parent_trackable(plane_id).is_empty());
}

#[test]
fn test_add_environment_probe() {
  let mut manager = TrackableManager::<EnvironmentProbe>::default();
  let mut provider = AcceptingProvider::default();

  let probe_id = manager
    .add_environment_probe(
      &mut provider,
      &mut NullLifecycle,
      Pose::IDENTITY,
      Vec3::ONE,
      Vec3::new(4.0, 3.0, 4.0),
    )
    .unwrap()
    .unwrap();

  let probe = manager.get_trackable(probe_id).unwrap();
  assert_eq!(probe.session_relative_data().size, Vec3::new(4.0, 3.0, 4.0));
  assert_eq!(probe.session_relative_data().extents(), Vec3::new(2.0, 1.5, 2.0));
  assert!(probe.manually_placed());

  provider.stopped = true;
  let skipped = manager.add_environment_probe(
    &mut provider,
    &mut NullLifecycle,
    Pose::IDENTITY,
    Vec3::ONE,
    Vec3::ONE,
  );
  assert_eq!(skipped, Ok(None));
}

#[test]
fn test_add_raycast() {
  let mut manager = TrackableManager::<TrackedRaycast>::default();
  let mut provider = AcceptingProvider::default();

  let raycast_id = manager
    .add_raycast(&mut provider, &mut NullLifecycle, Vec2::new(0.5, 0.5), 2.0)
    .unwrap()
    .unwrap();
  let raycast = manager.get_trackable(raycast_id).unwrap();
  assert_eq!(raycast.session_relative_data().distance, 2.0);
  assert_eq!(raycast.session_relative_data().hit_type, TrackableType::PLANE_ESTIMATED);

  let invalid = manager.add_raycast(&mut provider, &mut NullLifecycle, Vec2::ZERO, -1.0);
  assert!(matches!(invalid, Err(ArError::InvalidArgument(_))));
}

#[test]
fn test_disabled_kind_managers_reject_placement() {
  let disabled = TrackableManagerConfig::new().with_enabled(false);
  let mut provider = AcceptingProvider::default();

  let mut probes = TrackableManager::<EnvironmentProbe>::new(disabled.clone());
  let result = probes.add_environment_probe(
    &mut provider,
    &mut NullLifecycle,
    Pose::IDENTITY,
    Vec3::ONE,
    Vec3::ONE,
  );
  assert_eq!(
    result,
    Err(ArError::ManagerDisabled {
      kind: TrackableKind::EnvironmentProbe
    })
  );

  let mut raycasts = TrackableManager::<TrackedRaycast>::new(disabled);
  let result = raycasts.add_raycast(&mut provider, &mut NullLifecycle, Vec2::ZERO, 1.0);
  assert!(matches!(result, Err(ArError::ManagerDisabled { .. })));
}
