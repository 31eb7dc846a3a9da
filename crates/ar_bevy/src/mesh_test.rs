use ar_plugin::plane_mesh::{self, PlaneMeshData};
use ar_plugin::{BoundedPlane, NullLifecycle, Pose, TrackableId};
use bevy::mesh::{Indices, VertexAttributeValues};
use bevy::prelude::*;

use super::{plane_mesh_to_bevy, update_plane_meshes, PlaneMeshSettings};
use crate::{ArManager, ArSystems, ArTrackable, ArTrackablesPlugin, TrackableEntities};

#[test]
fn test_plane_mesh_to_bevy() {
  let plane = BoundedPlane::new(TrackableId::new(0, 1), Pose::IDENTITY, Vec2::new(2.0, 1.0));
  let mut data = PlaneMeshData::new();
  assert!(plane_mesh::try_generate_mesh(&plane.boundary, &mut data));

  let mesh = plane_mesh_to_bevy(&data);
  assert_eq!(mesh.count_vertices(), 4);
  let Some(VertexAttributeValues::Float32x3(normals)) = mesh.attribute(Mesh::ATTRIBUTE_NORMAL) else {
    panic!("missing normals");
  };
  assert!(normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
  assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
  match mesh.indices() {
    Some(Indices::U32(indices)) => assert_eq!(indices, &data.indices),
    other => panic!("unexpected indices {other:?}"),
  }
}

#[test]
fn test_empty_plane_mesh() {
  let mesh = plane_mesh_to_bevy(&PlaneMeshData::new());
  assert_eq!(mesh.count_vertices(), 0);
  assert!(mesh.indices().is_none());
}

fn mesh_app() -> App {
  let mut app = App::new();
  app
    .add_plugins(MinimalPlugins)
    .add_plugins(ArTrackablesPlugin::<BoundedPlane>::default())
    .init_resource::<Assets<Mesh>>()
    .init_resource::<PlaneMeshSettings>()
    .add_systems(Update, update_plane_meshes.in_set(ArSystems::Visuals));
  app
}

/// Create a plane without the provider, the way eager placement does.
fn spawn_eager_plane(app: &mut App, plane: BoundedPlane) -> Entity {
  let id = plane.trackable_id;
  let trackable: ArTrackable = app
    .world_mut()
    .resource_mut::<ArManager<BoundedPlane>>()
    .create_trackable_immediate(plane, &mut NullLifecycle)
    .into();
  let entity = app.world_mut().spawn(trackable).id();
  app
    .world_mut()
    .resource_mut::<TrackableEntities<BoundedPlane>>()
    .insert(id, entity);
  entity
}

#[test]
fn test_eager_plane_is_meshed_without_provider_report() {
  let mut app = mesh_app();
  let plane = BoundedPlane::new(TrackableId::new(0, 1), Pose::IDENTITY, Vec2::new(2.0, 1.0));
  let entity = spawn_eager_plane(&mut app, plane);
  assert!(app.world().get::<ArTrackable>(entity).unwrap().pending);

  app.update();

  let handle = app.world().get::<Mesh3d>(entity).expect("plane mesh").0.clone();
  let mesh = app.world().resource::<Assets<Mesh>>().get(&handle).unwrap();
  assert_eq!(mesh.count_vertices(), 4);
}

#[test]
fn test_untriangulable_plane_stays_unmeshed() {
  let mut app = mesh_app();
  let mut plane = BoundedPlane::new(TrackableId::new(0, 2), Pose::IDENTITY, Vec2::ONE);
  plane.boundary.truncate(2);
  let entity = spawn_eager_plane(&mut app, plane);

  app.update();
  app.update();

  assert!(app.world().get::<Mesh3d>(entity).is_none());
}
