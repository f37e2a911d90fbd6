//! Camera types, orbit controller and uniforms for view/projection.
//!
//! The camera is split the usual way: [`Camera`] holds the pose,
//! [`Projection`] holds the perspective parameters (and is the only thing a
//! resize touches), and [`OrbitController`] maps pointer drag/scroll input
//! into a pose orbiting a focal point.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};
use instant::Duration;
use winit::event::{MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_PITCH: f32 = FRAC_PI_2 - 0.05;

/// Camera pose: a position and a view direction given as yaw/pitch.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, Y: Into<Rad<f32>>, R: Into<Rad<f32>>>(
        position: P,
        yaw: Y,
        pitch: R,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();

        Matrix4::look_to_rh(
            self.position,
            Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize(),
            Vector3::unit_y(),
        )
    }
}

/// Perspective projection parameters.
///
/// Invariant: after [`resize`](Self::resize), `aspect` equals the surface's
/// width over height.
#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps pointer drag/scroll input into camera position/orientation changes
/// around a focal point.
///
/// Input accumulates between frames and is applied by [`update`](Self::update).
/// After [`release`](Self::release) the controller ignores all input and no
/// longer mutates the camera; release is part of the viewer's teardown
/// contract.
#[derive(Clone, Debug)]
pub struct OrbitController {
    target: Point3<f32>,
    distance: f32,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    rotate_delta: (f32, f32),
    scroll_delta: f32,
    sensitivity: f32,
    zoom_speed: f32,
    released: bool,
}

impl OrbitController {
    pub const MIN_DISTANCE: f32 = 1.0;
    pub const MAX_DISTANCE: f32 = 500.0;

    /// Derive the orbit state from the camera's start pose so the first
    /// interaction continues from where the scene initializer put it.
    pub fn from_camera(
        camera: &Camera,
        target: Point3<f32>,
        sensitivity: f32,
        zoom_speed: f32,
    ) -> Self {
        let offset = camera.position - target;
        let distance = offset.magnitude().max(Self::MIN_DISTANCE);
        let pitch = (offset.y / distance).asin();
        let yaw = offset.z.atan2(offset.x);
        Self {
            target,
            distance,
            yaw: Rad(yaw),
            pitch: Rad(pitch),
            rotate_delta: (0.0, 0.0),
            scroll_delta: 0.0,
            sensitivity,
            zoom_speed,
            released: false,
        }
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Accumulate a pointer drag.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if self.released {
            return;
        }
        self.rotate_delta.0 += dx as f32;
        self.rotate_delta.1 += dy as f32;
    }

    /// Pick up the window events the controller cares about (scroll zoom).
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            self.handle_scroll(delta);
        }
    }

    /// Accumulate a zoom step.
    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        if self.released {
            return;
        }
        self.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
        };
    }

    /// Apply accumulated input and write the orbiting pose into the camera.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        if self.released {
            return;
        }
        let dt = dt.as_secs_f32();

        self.yaw += Rad(self.rotate_delta.0 * self.sensitivity * dt);
        self.pitch += Rad(self.rotate_delta.1 * self.sensitivity * dt);
        self.pitch.0 = self.pitch.0.clamp(-SAFE_PITCH, SAFE_PITCH);
        self.rotate_delta = (0.0, 0.0);

        self.distance = (self.distance * (1.0 - self.scroll_delta * self.zoom_speed))
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        self.scroll_delta = 0.0;

        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let offset =
            Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw) * self.distance;

        camera.position = self.target + offset;
        // face back toward the focal point
        camera.yaw = Rad(self.yaw.0 + PI);
        camera.pitch = -self.pitch;
    }

    /// Detach the controller: all further input and updates are ignored.
    pub fn release(&mut self) {
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// Camera state bundled with its GPU resources.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
