//! Static scene content: the sea plane and the ambient hemisphere light.
//!
//! [`populate`] adds exactly two objects to a freshly initialized scene and
//! is meant to run once per scene lifetime; running it again would add
//! duplicates.

use cgmath::{Deg, Quaternion, Rotation3, Vector3};

use crate::data_structures::{
    instance::Instance,
    model::{Geometry, MaterialData, MeshVertex, Primitive},
    scene_graph::{HemisphereLight, MeshNode, Scene, SceneObject},
};

/// Edge length of the square sea plane.
pub const PLANE_SIZE: f32 = 1000.0;
/// Sea blue, also the light's ground half.
pub const SEA_COLOR: u32 = 0x4db8ff;
/// Light sky blue for the light's upper half.
pub const SKY_COLOR: u32 = 0x87cefa;

/// Add the two fixed objects: the sea plane, then the hemisphere light.
pub fn populate(scene: &mut Scene) {
    scene.add(SceneObject::Mesh(ground_plane()));
    scene.add(SceneObject::Light(hemisphere_light()));
}

/// The sea: a large flat quad built in the XY plane and rotated to lie
/// horizontal, the same way the plane would be authored in a DCC tool.
pub fn ground_plane() -> MeshNode {
    let half = PLANE_SIZE / 2.0;
    let geometry = Geometry {
        vertices: vec![
            MeshVertex {
                position: [-half, -half, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [0.0, 1.0],
            },
            MeshVertex {
                position: [half, -half, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [1.0, 1.0],
            },
            MeshVertex {
                position: [half, half, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [1.0, 0.0],
            },
            MeshVertex {
                position: [-half, half, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [0.0, 0.0],
            },
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    };

    let [r, g, b] = rgb(SEA_COLOR);
    let mut node = MeshNode::with_primitives(
        "ground_plane",
        vec![Primitive {
            geometry,
            material: MaterialData::colored("sea", [r, g, b, 1.0]),
        }],
    );
    node.transform = Instance {
        // tip the quad from vertical to horizontal, normal up
        rotation: Quaternion::from_axis_angle(Vector3::unit_x(), Deg(-90.0)),
        ..Instance::default()
    };
    node
}

pub fn hemisphere_light() -> HemisphereLight {
    HemisphereLight {
        sky_color: rgb(SKY_COLOR),
        ground_color: rgb(SEA_COLOR),
        intensity: 1.0,
    }
}

fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
