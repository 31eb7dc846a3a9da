//! Plane boundary meshes for Bevy.

use std::collections::BTreeSet;

use ar_plugin::plane_mesh::{self, PlaneMeshConfig, PlaneMeshData};
use ar_plugin::{BoundedPlane, TrackableId, TrackableKind};
use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::components::ArTrackable;
use crate::messages::TrackablesUpdated;
use crate::resources::{ArManager, TrackableEntities};

/// UV settings for generated plane meshes.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct PlaneMeshSettings(pub PlaneMeshConfig);

/// Convert triangulated plane data to a Bevy Mesh in plane space.
pub fn plane_mesh_to_bevy(data: &PlaneMeshData) -> Mesh {
  let mut mesh = Mesh::new(
    PrimitiveTopology::TriangleList,
    RenderAssetUsages::default(),
  );

  if data.is_empty() {
    return mesh;
  }

  let positions: Vec<[f32; 3]> = data.vertices.iter().map(|v| v.to_array()).collect();
  let normals: Vec<[f32; 3]> = data.normals.iter().map(|n| n.to_array()).collect();
  let uvs: Vec<[f32; 2]> = data.uvs.iter().map(|uv| uv.to_array()).collect();

  mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
  mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
  mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
  mesh.insert_indices(Indices::U32(data.indices.clone()));

  mesh
}

/// System regenerating the mesh of every added or updated plane.
///
/// Plane entities without a mesh are meshed too, so planes created eagerly
/// get one before the provider reports them. A boundary that fails to
/// triangulate keeps the plane's previous mesh.
pub fn update_plane_meshes(
  mut updates: MessageReader<TrackablesUpdated<BoundedPlane>>,
  unmeshed: Query<&ArTrackable, Without<Mesh3d>>,
  planes: Res<ArManager<BoundedPlane>>,
  entities: Res<TrackableEntities<BoundedPlane>>,
  settings: Res<PlaneMeshSettings>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut commands: Commands,
  mut scratch: Local<PlaneMeshData>,
) {
  let reported: BTreeSet<TrackableId> = updates.read().flat_map(|update| update.changed()).collect();
  let eager = unmeshed
    .iter()
    .filter(|t| t.kind == TrackableKind::Plane && !reported.contains(&t.id))
    .map(|t| (t.id, false));

  for (id, was_reported) in reported.iter().map(|id| (*id, true)).chain(eager) {
    let (Some(plane), Some(entity)) = (planes.get_trackable(id), entities.get(id)) else {
      continue;
    };
    let boundary = &plane.session_relative_data().boundary;
    if !plane_mesh::try_generate_mesh_with_config(boundary, &settings, &mut scratch) {
      // Unreported planes are retried every frame; only log real updates.
      if was_reported {
        debug!(%id, vertices = boundary.len(), "plane boundary not triangulated, keeping previous mesh");
      }
      continue;
    }
    let handle = meshes.add(plane_mesh_to_bevy(&scratch));
    commands.entity(entity).try_insert(Mesh3d(handle));
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
