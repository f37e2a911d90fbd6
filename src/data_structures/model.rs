//! Mesh and material definitions.
//!
//! Geometry lives on the CPU first (`Geometry`, `MaterialData`, `Primitive`)
//! so a scene can be assembled and inspected without a GPU device; the
//! render driver turns primitives into their GPU form (`GpuPrimitive`) with
//! an upload pass before drawing.

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Vertex format shared by every mesh the viewer draws.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side triangle soup for one primitive.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// CPU-side material: a base-color factor and an optional decoded image.
///
/// The image is kept decoded (not as raw file bytes) so the upload pass
/// never fails on malformed data; decode errors surface during loading
/// where they belong.
#[derive(Clone, Debug)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    pub image: Option<image::RgbaImage>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            image: None,
        }
    }
}

impl MaterialData {
    pub fn colored(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            image: None,
        }
    }
}

/// One drawable unit: geometry plus the material it is shaded with.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub geometry: Geometry,
    pub material: MaterialData,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
}

/// Bind group layout every material bind group is created against:
/// base-color texture, its sampler, and the base-color factor uniform.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// GPU form of a [`Primitive`]: vertex/index buffers plus the material
/// bind group, ready to be drawn.
#[derive(Debug)]
pub struct GpuPrimitive {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material_bind_group: wgpu::BindGroup,
}

impl Primitive {
    pub fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> Result<GpuPrimitive> {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&self.geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", label)),
            contents: bytemuck::cast_slice(&self.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let texture = match &self.material.image {
            Some(img) => Texture::from_image(
                device,
                queue,
                &image::DynamicImage::ImageRgba8(img.clone()),
                Some(&self.material.name),
            )?,
            None => Texture::white(device, queue),
        };

        let uniform = MaterialUniform {
            base_color: self.material.base_color,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
            label: Some(&format!("{:?} material", label)),
        });

        Ok(GpuPrimitive {
            vertex_buffer,
            index_buffer,
            num_elements: self.geometry.indices.len() as u32,
            material_bind_group,
        })
    }
}

/// Render-pass extension for drawing uploaded primitives.
pub trait DrawPrimitive<'a> {
    fn draw_primitive(
        &mut self,
        primitive: &'a GpuPrimitive,
        instances: &'a wgpu::Buffer,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawPrimitive<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_primitive(
        &mut self,
        primitive: &'b GpuPrimitive,
        instances: &'b wgpu::Buffer,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, instances.slice(..));
        self.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &primitive.material_bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..primitive.num_elements, 0, 0..1);
    }
}
