use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::HemisphereLight;

/// GPU bundle for the scene's hemisphere light.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: HemisphereLightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HemisphereLightUniform {
    sky_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    ground_color: [f32; 3],
    intensity: f32,
}

impl From<&HemisphereLight> for HemisphereLightUniform {
    fn from(light: &HemisphereLight) -> Self {
        Self {
            sky_color: light.sky_color,
            _padding: 0,
            ground_color: light.ground_color,
            intensity: light.intensity,
        }
    }
}

impl Default for HemisphereLightUniform {
    /// Neutral lighting until the scene provides a light: both halves white
    /// at full intensity, so shading reduces to plain albedo.
    fn default() -> Self {
        Self {
            sky_color: [1.0, 1.0, 1.0],
            _padding: 0,
            ground_color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: HemisphereLightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Hemisphere Light Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

impl LightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = HemisphereLightUniform::default();
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Push the scene's light values to the GPU if they changed.
    pub fn update(&mut self, queue: &wgpu::Queue, light: &HemisphereLight) {
        let uniform = HemisphereLightUniform::from(light);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}
