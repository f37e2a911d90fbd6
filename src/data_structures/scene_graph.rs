//! Scene root and hierarchical scene organization.
//!
//! The scene is CPU-first: nodes hold decoded geometry and transforms, and
//! the render driver runs [`Scene::upload_pending`] before encoding a frame
//! so anything attached since the last frame (the loaded model subtree)
//! gains its GPU buffers. Structural queries (object and descendant counts)
//! therefore work without a device.

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    model::{GpuPrimitive, Primitive},
};

/// An ambient light source with two colors blended by surface normal
/// direction: sky for up-facing normals, ground for down-facing ones.
#[derive(Clone, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

/// Anything the scene root can hold directly.
#[derive(Debug)]
pub enum SceneObject {
    Mesh(MeshNode),
    Light(HemisphereLight),
}

/// One node of a mesh hierarchy: a local transform, zero or more drawable
/// primitives, and child nodes. A node without primitives is a pure
/// grouping node (glTF produces these routinely).
#[derive(Debug)]
pub struct MeshNode {
    pub name: String,
    pub transform: Instance,
    pub primitives: Vec<Primitive>,
    children: Vec<MeshNode>,
    gpu: Option<NodeGpu>,
}

#[derive(Debug)]
struct NodeGpu {
    instance_buffer: wgpu::Buffer,
    primitives: Vec<GpuPrimitive>,
}

impl MeshNode {
    /// A grouping node with no geometry of its own.
    pub fn group(name: &str) -> Self {
        Self::with_primitives(name, Vec::new())
    }

    pub fn with_primitives(name: &str, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.to_string(),
            transform: Instance::default(),
            primitives,
            children: Vec::new(),
            gpu: None,
        }
    }

    pub fn add_child(&mut self, child: MeshNode) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[MeshNode] {
        &self.children
    }

    /// This node plus everything below it.
    pub fn descendant_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(MeshNode::descendant_count)
            .sum::<usize>()
    }

    fn contains(&self, name: &str) -> bool {
        self.name == name || self.children.iter().any(|child| child.contains(name))
    }

    /// Create GPU buffers for this node and its children where missing.
    ///
    /// World transforms are resolved here as parent * local, so the walk
    /// must always start from the root with an identity parent.
    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material_layout: &wgpu::BindGroupLayout,
        parent_world: &Instance,
    ) -> Result<()> {
        let world = parent_world * &self.transform;
        if self.gpu.is_none() && !self.primitives.is_empty() {
            let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Instance Buffer"),
                contents: bytemuck::cast_slice(&[world.to_raw()]),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            let primitives = self
                .primitives
                .iter()
                .map(|primitive| primitive.upload(device, queue, material_layout, &self.name))
                .collect::<Result<Vec<_>>>()?;
            self.gpu = Some(NodeGpu {
                instance_buffer,
                primitives,
            });
        }
        for child in &mut self.children {
            child.upload(device, queue, material_layout, &world)?;
        }
        Ok(())
    }

    fn collect_draws<'a>(&'a self, out: &mut Vec<Draw<'a>>) {
        if let Some(gpu) = &self.gpu {
            for primitive in &gpu.primitives {
                out.push(Draw {
                    primitive,
                    instances: &gpu.instance_buffer,
                });
            }
        }
        for child in &self.children {
            child.collect_draws(out);
        }
    }
}

/// One uploaded primitive together with its placement buffer.
pub struct Draw<'a> {
    pub primitive: &'a GpuPrimitive,
    pub instances: &'a wgpu::Buffer,
}

/// The top-level container holding all renderable and light entities for
/// one frame's render pass. Created empty; mutated only by its owner.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Attach a loaded model subtree under the root.
    pub fn attach_model(&mut self, node: MeshNode) {
        self.objects.push(SceneObject::Mesh(node));
    }

    /// Number of objects held directly by the root.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Total node count: each light is one node, each mesh subtree counts
    /// all of its nodes.
    pub fn descendant_count(&self) -> usize {
        self.objects
            .iter()
            .map(|object| match object {
                SceneObject::Mesh(node) => node.descendant_count(),
                SceneObject::Light(_) => 1,
            })
            .sum()
    }

    /// Whether any mesh node in the scene carries this name.
    pub fn contains_node(&self, name: &str) -> bool {
        self.objects.iter().any(|object| match object {
            SceneObject::Mesh(node) => node.contains(name),
            SceneObject::Light(_) => false,
        })
    }

    /// The scene's hemisphere light, if one was added.
    pub fn hemisphere_light(&self) -> Option<&HemisphereLight> {
        self.objects.iter().find_map(|object| match object {
            SceneObject::Light(light) => Some(light),
            SceneObject::Mesh(_) => None,
        })
    }

    /// Create GPU resources for every mesh node that does not have them yet.
    pub fn upload_pending(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Result<()> {
        let root = Instance::default();
        for object in &mut self.objects {
            if let SceneObject::Mesh(node) = object {
                node.upload(device, queue, material_layout, &root)?;
            }
        }
        Ok(())
    }

    /// Collect everything drawable, in insertion order.
    pub fn draws(&self) -> Vec<Draw<'_>> {
        let mut out = Vec::new();
        for object in &self.objects {
            if let SceneObject::Mesh(node) = object {
                node.collect_draws(&mut out);
            }
        }
        out
    }
}
