use glam::{Quat, Vec3};

use super::*;
use crate::lifecycle::NullLifecycle;
use crate::manager::TrackableManagerConfig;

fn test_box(n: u64, pose: Pose, size: Vec3) -> BoundingBox {
  BoundingBox::new(TrackableId::new(0, n), pose, size)
}

#[test]
fn test_face_rotation_maps_up_to_normal() {
  for face in Face::ALL {
    let up = face.rotation() * Vec3::Y;
    assert!(
      up.abs_diff_eq(face.local_normal(), 1e-6),
      "{face:?}: {up} != {}",
      face.local_normal()
    );
  }
}

#[test]
fn test_ray_at_face_center_hits_only_that_face() {
  let center = Pose::new(
    Vec3::new(1.0, 2.0, -3.0),
    Quat::from_euler(glam::EulerRot::YXZ, 0.4, -0.2, 0.9),
  );
  let size = Vec3::new(2.0, 1.0, 3.0);
  let half = size * 0.5;
  let bbox = test_box(1, center, size);

  for face in Face::ALL {
    let normal = center.rotation * face.local_normal();
    let face_center = center.position + normal * half[face.axis];
    let ray = Ray::new(face_center + normal * 5.0, -normal);

    let mut hits = Vec::new();
    raycast(&ray, [&bbox], &mut hits);

    assert_eq!(hits.len(), 1, "{face:?}");
    let hit = hits[0];
    assert_eq!(hit.trackable_id, bbox.trackable_id);
    assert_eq!(hit.hit_type, TrackableType::BOUNDING_BOX);
    assert!((hit.distance - 5.0).abs() < 1e-4, "{face:?}: {}", hit.distance);
    assert!(hit.pose.position.abs_diff_eq(face_center, 1e-4), "{face:?}");
    assert!(hit.pose.up().abs_diff_eq(normal, 1e-4), "{face:?}");
  }
}

#[test]
fn test_miss_and_behind() {
  let bbox = test_box(1, Pose::IDENTITY, Vec3::ONE);

  let mut hits = Vec::new();
  // Passes beside the box.
  raycast(&Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::Z), [&bbox], &mut hits);
  // Points away from the box.
  raycast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z), [&bbox], &mut hits);
  assert!(hits.is_empty());
}

#[test]
fn test_origin_inside_hits_exit_face() {
  let bbox = test_box(1, Pose::IDENTITY, Vec3::splat(2.0));
  let mut hits = Vec::new();
  raycast(&Ray::new(Vec3::ZERO, Vec3::X), [&bbox], &mut hits);

  assert_eq!(hits.len(), 1);
  assert!((hits[0].distance - 1.0).abs() < 1e-6);
  assert!(hits[0].pose.up().abs_diff_eq(Vec3::X, 1e-6));
}

#[test]
fn test_oblique_ray_reports_nearest_face() {
  let bbox = test_box(1, Pose::IDENTITY, Vec3::splat(2.0));
  // Enters through the top face, leaves through the bottom.
  let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.4, -2.0, 0.0));
  let (distance, pose) = raycast_box(&ray, &bbox.pose, bbox.half_extents()).unwrap();

  assert!(pose.up().abs_diff_eq(Vec3::Y, 1e-6));
  assert!(pose.position.abs_diff_eq(Vec3::new(0.4, 1.0, 0.0), 1e-5));
  assert!((distance - 4.16f32.sqrt()).abs() < 1e-5);
}

#[test]
fn test_exit_through_edge_reports_entry_face() {
  let bbox = test_box(1, Pose::IDENTITY, Vec3::splat(2.0));
  // Enters through -Z, leaves through the +X/+Y edge. Both exit faces come
  // before -Z in face order.
  let ray = Ray::new(Vec3::new(-1.0, -1.0, -2.5), Vec3::new(1.0, 1.0, 1.5));
  let (distance, pose) = raycast_box(&ray, &bbox.pose, bbox.half_extents()).unwrap();

  let entry = 17.0f32.sqrt() / 2.0;
  assert!((distance - entry).abs() < 1e-5, "{distance} != {entry}");
  assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
  assert!(pose.up().abs_diff_eq(Vec3::NEG_Z, 1e-5));
}

#[test]
fn test_one_hit_per_box() {
  let near = test_box(1, Pose::from_position(Vec3::new(0.0, 0.0, 3.0)), Vec3::ONE);
  let far = test_box(2, Pose::from_position(Vec3::new(0.0, 0.0, 6.0)), Vec3::ONE);
  let aside = test_box(3, Pose::from_position(Vec3::new(4.0, 0.0, 3.0)), Vec3::ONE);

  let mut hits = Vec::new();
  raycast(&Ray::new(Vec3::ZERO, Vec3::Z), [&near, &far, &aside], &mut hits);

  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].trackable_id, near.trackable_id);
  assert!((hits[0].distance - 2.5).abs() < 1e-6);
  assert_eq!(hits[1].trackable_id, far.trackable_id);
  assert!((hits[1].distance - 5.5).abs() < 1e-6);
}

#[test]
fn test_manager_fallback_respects_mask_and_config() {
  let mut manager = TrackableManager::<BoundingBox>::default();
  manager.create_trackable_immediate(
    test_box(1, Pose::from_position(Vec3::new(0.0, 0.0, 3.0)), Vec3::ONE),
    &mut NullLifecycle,
  );
  let ray = Ray::new(Vec3::ZERO, Vec3::Z);

  let mut hits = Vec::new();
  manager.raycast_fallback(&ray, TrackableType::PLANES, &mut hits);
  assert!(hits.is_empty());

  manager.raycast_fallback(&ray, TrackableType::ALL_TYPES, &mut hits);
  assert_eq!(hits.len(), 1);
  assert!(manager.owns(TrackableId::new(0, 1)));
  assert_eq!(manager.kind(), TrackableKind::BoundingBox);

  assert!(manager.is_fallback_enabled());
  manager.set_fallback_raycasting(false);
  assert!(!manager.is_fallback_enabled());

  let disabled = TrackableManager::<BoundingBox>::new(TrackableManagerConfig::new().with_enabled(false));
  assert!(!disabled.is_fallback_enabled());
}
