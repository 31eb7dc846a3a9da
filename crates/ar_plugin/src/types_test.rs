use glam::{Quat, Vec3};

use super::*;

// TrackableId tests
#[test]
fn test_invalid_id() {
  assert!(!TrackableId::INVALID.is_valid());
  assert!(TrackableId::new(0, 1).is_valid());
  assert_eq!(TrackableId::default(), TrackableId::INVALID);
}

#[test]
fn test_id_ordering() {
  let a = TrackableId::new(1, 9);
  let b = TrackableId::new(2, 0);
  let c = TrackableId::new(2, 1);
  assert!(a < b);
  assert!(b < c);
}

#[test]
fn test_id_display() {
  let id = TrackableId::new(0xABCD, 1);
  assert_eq!(id.to_string(), "000000000000ABCD-0000000000000001");
}

// Pose tests
#[test]
fn test_pose_inverse_roundtrip() {
  let pose = Pose::new(
    Vec3::new(1.0, -2.0, 3.0),
    Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3),
  );
  let composed = pose.transform_pose(&pose.inverse());
  assert!(composed.abs_diff_eq(&Pose::IDENTITY, 1e-5));
}

#[test]
fn test_pose_transform_and_inverse_transform() {
  let parent = Pose::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
  let child = Pose::new(Vec3::new(0.0, 1.0, 2.0), Quat::from_rotation_z(0.25));

  let world = parent.transform_pose(&child);
  let back = parent.inverse_transform_pose(&world);
  assert!(back.abs_diff_eq(&child, 1e-5));

  // +Z rotated 90° about Y points along +X
  let p = parent.transform_position(Vec3::Z);
  assert!(p.abs_diff_eq(Vec3::new(11.0, 0.0, 0.0), 1e-5));
}

#[test]
fn test_pose_axes() {
  let pose = Pose::IDENTITY;
  assert_eq!(pose.up(), Vec3::Y);
  assert_eq!(pose.forward(), Vec3::Z);
  assert_eq!(pose.right(), Vec3::X);
}

// TrackingState tests
#[test]
fn test_tracking_state_usable() {
  assert!(!TrackingState::None.is_usable());
  assert!(TrackingState::Limited.is_usable());
  assert!(TrackingState::Tracking.is_usable());
}

// TrackableType tests
#[test]
fn test_trackable_type_masks() {
  let planes = TrackableType::PLANES;
  assert!(planes.contains(TrackableType::PLANE_WITHIN_POLYGON));
  assert!(planes.contains(TrackableType::PLANE_ESTIMATED));
  assert!(!planes.intersects(TrackableType::BOUNDING_BOX));

  let mask = TrackableType::PLANE_WITHIN_BOUNDS | TrackableType::IMAGE;
  assert_eq!(mask & TrackableType::PLANES, TrackableType::PLANE_WITHIN_BOUNDS);
  assert_eq!((!mask) & mask, TrackableType::NONE);
  assert!(TrackableType::ALL_TYPES.contains(TrackableType::BOUNDING_BOX));
}

#[test]
fn test_trackable_type_from_bits_masks_unknown() {
  let t = TrackableType::from_bits(u32::MAX);
  assert_eq!(t, TrackableType::ALL_TYPES);
}

// Ray tests
#[test]
fn test_ray_plane_intersection() {
  let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -2.0, 0.0));
  assert_eq!(ray.direction, Vec3::NEG_Y);

  let distance = ray.intersect_plane(Vec3::ZERO, Vec3::Y).unwrap();
  assert!((distance - 5.0).abs() < 1e-6);
  assert!(ray.point_at(distance).abs_diff_eq(Vec3::ZERO, 1e-6));
}

#[test]
fn test_ray_plane_behind_or_parallel() {
  let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
  assert!(ray.intersect_plane(Vec3::ZERO, Vec3::Y).is_none());

  let parallel = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X);
  assert!(parallel.intersect_plane(Vec3::ZERO, Vec3::Y).is_none());
}

#[test]
fn test_ray_local_roundtrip() {
  let pose = Pose::new(Vec3::new(3.0, 1.0, -4.0), Quat::from_rotation_x(0.5));
  let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, 1.0));
  let back = ray.to_local(&pose).to_parent(&pose);
  assert!(back.origin.abs_diff_eq(ray.origin, 1e-5));
  assert!(back.direction.abs_diff_eq(ray.direction, 1e-5));
}
