use std::sync::Arc;

use anyhow::{Context as _, Result};
use cgmath::Point3;
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{self, CameraResources, CameraUniform},
    data_structures::{model, texture},
    pipelines::{light::LightResources, mesh},
};

// Camera constants: 75° field of view, clip planes 0.1..1000, start pose a
// fixed offset from the origin the orbit controller then circles around.
const CAMERA_START: (f32, f32, f32) = (5.0, 10.0, 5.0);
const CAMERA_FOV_DEG: f32 = 75.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;
const ORBIT_SENSITIVITY: f32 = 0.6;
const ORBIT_ZOOM_SPEED: f32 = 0.1;

/// Central GPU and window context: owns the surface, device/queue, depth
/// buffer, camera and light resources and the mesh pipeline.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    pub camera: CameraResources,
    pub projection: camera::Projection,
    pub light: LightResources,
    pub mesh_pipeline: wgpu::RenderPipeline,
    pub material_layout: wgpu::BindGroupLayout,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Prefer an sRGB surface; the shader and textures assume it.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut camera = camera::Camera::new(CAMERA_START, cgmath::Deg(0.0), cgmath::Deg(0.0));
        let projection = camera::Projection::new(
            config.width,
            config.height,
            cgmath::Deg(CAMERA_FOV_DEG),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        let mut camera_controller = camera::OrbitController::from_camera(
            &camera,
            Point3::new(0.0, 0.0, 0.0),
            ORBIT_SENSITIVITY,
            ORBIT_ZOOM_SPEED,
        );
        // snap the start pose onto the orbit so frame zero already faces the target
        camera_controller.update(&mut camera, Duration::ZERO);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
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
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(&device);
        let mesh_pipeline = mesh::mk_mesh_pipeline(
            &device,
            &config,
            &camera_bind_group_layout,
            &light.bind_group_layout,
        );
        let material_layout = model::material_layout(&device);

        let camera = CameraResources {
            camera,
            controller: camera_controller,
            uniform: camera_uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            clear_colour: wgpu::Color::BLACK,
            camera,
            projection,
            light,
            mesh_pipeline,
            material_layout,
            window,
            depth_texture,
        })
    }
}
