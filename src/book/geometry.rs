//! Skinned page geometry
//!
//! A leaf is a thin box with its spine on the local y axis (x = 0) and its
//! free edge at x = width. The box is cut into `segments` columns so that the
//! bone chain can bend it. Every vertex is bound to the two joints around it
//! with complementary weights taken from its position inside its column.
//!
//! Bevy binds one material per mesh, so the box is emitted as three meshes
//! that share the same skinning layout: the front face, the back face and the
//! edges. The meshes are built once and shared by every page instance; only
//! the joints differ per instance.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::skinning::SkinnedMeshInverseBindposes;
use bevy::render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};

use crate::book::skeleton::BoneChain;
use crate::core::settings::{
    PAGE_DEPTH, PAGE_HEIGHT, PAGE_HEIGHT_SEGMENTS, PAGE_SEGMENTS, PAGE_WIDTH,
};
use crate::ui::theme::PAGE_EDGE_COLOR;

/// Size and subdivision of a leaf
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub segments: usize,
    pub height_segments: usize,
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            depth: PAGE_DEPTH,
            segments: PAGE_SEGMENTS,
            height_segments: PAGE_HEIGHT_SEGMENTS,
        }
    }
}

impl PageDimensions {
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    /// Joint indices and weights for a vertex at distance `x` from the spine.
    ///
    /// The vertex sits in column `k` and is shared between joints `k` and
    /// `k + 1`. Vertices on the free edge belong to the last column.
    pub fn skin_for(&self, x: f32) -> ([u16; 4], [f32; 4]) {
        let segment_width = self.segment_width();
        let column = ((x / segment_width).floor().max(0.0) as usize)
            .min(self.segments - 1);
        let weight =
            ((x - column as f32 * segment_width) / segment_width).clamp(0.0, 1.0);
        (
            [column as u16, column as u16 + 1, 0, 0],
            [1.0 - weight, weight, 0.0, 0.0],
        )
    }
}

/// Vertex buffers for one part of the leaf
#[derive(Default, Debug, Clone)]
pub struct PageMeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joint_indices: Vec<[u16; 4]>,
    pub joint_weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl PageMeshData {
    fn push_vertex(
        &mut self,
        dims: &PageDimensions,
        position: [f32; 3],
        normal: [f32; 3],
        uv: [f32; 2],
    ) -> u32 {
        let (joints, weights) = dims.skin_for(position[0]);
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.joint_indices.push(joints);
        self.joint_weights.push(weights);
        (self.positions.len() - 1) as u32
    }

    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn to_mesh(&self) -> Mesh {
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_POSITION,
                self.positions.clone(),
            )
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone())
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone())
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_JOINT_INDEX,
                VertexAttributeValues::Uint16x4(self.joint_indices.clone()),
            )
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_JOINT_WEIGHT,
                self.joint_weights.clone(),
            )
            .with_inserted_indices(Indices::U32(self.indices.clone()))
    }
}

/// Which side of the leaf a face shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceSide {
    Front,
    Back,
}

/// Builds the front face grid (+Z) or the back face grid (-Z, U mirrored so
/// the picture reads correctly once the leaf is turned over).
pub fn build_face(dims: &PageDimensions, side: FaceSide) -> PageMeshData {
    let mut data = PageMeshData::default();
    let (z, normal) = match side {
        FaceSide::Front => (dims.depth / 2.0, [0.0, 0.0, 1.0]),
        FaceSide::Back => (-dims.depth / 2.0, [0.0, 0.0, -1.0]),
    };
    let columns = dims.segments + 1;
    let rows = dims.height_segments + 1;

    for row in 0..rows {
        let v = row as f32 / dims.height_segments as f32;
        let y = -dims.height / 2.0 + v * dims.height;
        for column in 0..columns {
            let u = column as f32 / dims.segments as f32;
            let x = u * dims.width;
            let u = match side {
                FaceSide::Front => u,
                FaceSide::Back => 1.0 - u,
            };
            data.push_vertex(dims, [x, y, z], normal, [u, 1.0 - v]);
        }
    }

    for row in 0..dims.height_segments {
        for column in 0..dims.segments {
            let a = (row * columns + column) as u32;
            let b = a + 1;
            let c = a + 1 + columns as u32;
            let d = a + columns as u32;
            match side {
                FaceSide::Front => data.push_quad(a, b, c, d),
                FaceSide::Back => data.push_quad(a, d, c, b),
            }
        }
    }
    data
}

/// Builds the thin sides of the leaf: top, bottom, spine and free edge.
pub fn build_edges(dims: &PageDimensions) -> PageMeshData {
    let mut data = PageMeshData::default();
    let half_height = dims.height / 2.0;
    let half_depth = dims.depth / 2.0;
    let segment_width = dims.segment_width();

    // Top and bottom strips follow the columns so they bend with the faces
    for (y, normal, top) in [
        (half_height, [0.0, 1.0, 0.0], true),
        (-half_height, [0.0, -1.0, 0.0], false),
    ] {
        let start = data.vertex_count() as u32;
        for column in 0..=dims.segments {
            let x = column as f32 * segment_width;
            let u = column as f32 / dims.segments as f32;
            data.push_vertex(dims, [x, y, half_depth], normal, [u, 0.0]);
            data.push_vertex(dims, [x, y, -half_depth], normal, [u, 1.0]);
        }
        for column in 0..dims.segments as u32 {
            let near_front = start + column * 2;
            let near_back = near_front + 1;
            let far_front = near_front + 2;
            let far_back = near_front + 3;
            if top {
                data.push_quad(near_front, far_front, far_back, near_back);
            } else {
                data.push_quad(near_front, near_back, far_back, far_front);
            }
        }
    }

    // Spine (-X) and free edge (+X)
    for (x, normal, free_edge) in [
        (0.0, [-1.0, 0.0, 0.0], false),
        (dims.width, [1.0, 0.0, 0.0], true),
    ] {
        let a = data.push_vertex(dims, [x, -half_height, half_depth], normal, [0.0, 1.0]);
        let b = data.push_vertex(dims, [x, -half_height, -half_depth], normal, [1.0, 1.0]);
        let c = data.push_vertex(dims, [x, half_height, -half_depth], normal, [1.0, 0.0]);
        let d = data.push_vertex(dims, [x, half_height, half_depth], normal, [0.0, 0.0]);
        if free_edge {
            data.push_quad(a, b, c, d);
        } else {
            data.push_quad(a, d, c, b);
        }
    }
    data
}

/// Shared page meshes, built once at startup
#[derive(Resource, Clone)]
pub struct PageGeometry {
    pub dimensions: PageDimensions,
    pub front: Handle<Mesh>,
    pub back: Handle<Mesh>,
    pub edges: Handle<Mesh>,
    pub edge_material: Handle<StandardMaterial>,
    pub inverse_bindposes: Handle<SkinnedMeshInverseBindposes>,
}

impl PageGeometry {
    pub fn face(&self, side: FaceSide) -> Handle<Mesh> {
        match side {
            FaceSide::Front => self.front.clone(),
            FaceSide::Back => self.back.clone(),
        }
    }
}

/// Startup system that builds the shared page meshes
pub fn build_page_geometry(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut bindposes: ResMut<Assets<SkinnedMeshInverseBindposes>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let dimensions = PageDimensions::default();
    let chain = BoneChain::new(dimensions.segments, dimensions.segment_width());

    let front = meshes.add(build_face(&dimensions, FaceSide::Front).to_mesh());
    let back = meshes.add(build_face(&dimensions, FaceSide::Back).to_mesh());
    let edges = meshes.add(build_edges(&dimensions).to_mesh());
    let inverse_bindposes = bindposes.add(chain.inverse_bind_poses());
    let edge_material = materials.add(StandardMaterial {
        base_color: PAGE_EDGE_COLOR,
        perceptual_roughness: 0.8,
        ..default()
    });

    info!(
        "Built page geometry: {} segments, {} joints",
        dimensions.segments,
        chain.len()
    );
    commands.insert_resource(PageGeometry {
        dimensions,
        front,
        back,
        edges,
        edge_material,
        inverse_bindposes,
    });
}
