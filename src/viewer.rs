//! The viewer application and event loop.
//!
//! This module owns the component lifecycle the rest of the crate plugs
//! into. On startup it builds the [`ViewerState`] (context, scene, static
//! content), kicks off the asynchronous model load, and drives the render
//! loop; on teardown it cancels the loop, cancels the load, and releases
//! the orbit controller.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and initializes [`ViewerState`]
//!    (blocking on native, via a user event round-trip on wasm)
//! 2. the model load task runs in the background and re-enters the event
//!    loop with a loaded/failed user event
//! 3. every `RedrawRequested` renders one frame and re-arms through the
//!    [`FrameLoop`] state machine
//! 4. `CloseRequested` tears the state down and exits the loop

use std::{iter, sync::Arc};

use anyhow::Result;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    content,
    context::Context,
    data_structures::{
        model::DrawPrimitive,
        scene_graph::{MeshNode, Scene},
        texture::Texture,
    },
    resources::{self, CancelToken},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// The model the viewer shows when none is specified.
pub const DEFAULT_MODEL_PATH: &str = "models/Tugboat.gltf";

/// Render-loop scheduling state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FramePhase {
    Scheduled,
    Cancelled,
}

/// Explicit state machine for the self-rescheduling render loop.
///
/// The loop is born `Scheduled`; each redraw consumes the slot via
/// [`begin_frame`](Self::begin_frame) and re-arms via [`arm`](Self::arm).
/// [`cancel`](Self::cancel) is compare-and-clear: it revokes a pending
/// frame exactly once and is terminal, so a redraw that was already queued
/// when teardown ran neither renders nor re-arms.
#[derive(Debug)]
pub struct FrameLoop {
    phase: FramePhase,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            phase: FramePhase::Scheduled,
            frames: 0,
        }
    }

    /// Consume the scheduled slot for one frame. Returns false once the
    /// loop is cancelled; the caller must then skip all frame work.
    pub fn begin_frame(&mut self) -> bool {
        match self.phase {
            FramePhase::Scheduled => {
                self.frames += 1;
                true
            }
            FramePhase::Cancelled => false,
        }
    }

    /// Whether the next frame may be scheduled. Never true again after
    /// cancellation.
    pub fn arm(&mut self) -> bool {
        self.phase == FramePhase::Scheduled
    }

    /// Revoke the pending frame. Returns true only on the transition out
    /// of `Scheduled`, so a second cancel reports nothing to revoke.
    pub fn cancel(&mut self) -> bool {
        let revoked = self.phase == FramePhase::Scheduled;
        self.phase = FramePhase::Cancelled;
        revoked
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == FramePhase::Cancelled
    }

    /// Frames begun so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the viewer owns, built once on mount and torn down together.
///
/// Holding the pieces in one struct makes the teardown obligations a
/// visible contract instead of scattered instance fields.
#[derive(Debug)]
pub struct ViewerState {
    pub(crate) ctx: Context,
    pub(crate) scene: Scene,
    frame_loop: FrameLoop,
    load_token: CancelToken,
    is_surface_configured: bool,
    mouse_pressed: bool,
    last_frame: Instant,
}

impl ViewerState {
    async fn new(window: Arc<Window>) -> Result<Self> {
        let ctx = Context::new(window).await?;
        let mut scene = Scene::new();
        content::populate(&mut scene);
        Ok(Self {
            ctx,
            scene,
            frame_loop: FrameLoop::new(),
            load_token: CancelToken::new(),
            is_surface_configured: false,
            mouse_pressed: false,
            last_frame: Instant::now(),
        })
    }

    /// Resize handler: surface, depth buffer and camera aspect move
    /// together so the projection invariant holds after every call.
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// Render one frame of whatever the scene currently holds.
    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.frame_loop.begin_frame() {
            // a redraw that fired before cancellation landed; drop it
            return Ok(());
        }

        let dt = self.last_frame.elapsed();
        self.last_frame = Instant::now();

        let ctx = &mut self.ctx;
        ctx.camera
            .controller
            .update(&mut ctx.camera.camera, dt);
        ctx.camera
            .uniform
            .update_view_proj(&ctx.camera.camera, &ctx.projection);
        ctx.queue.write_buffer(
            &ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[ctx.camera.uniform]),
        );
        if let Some(light) = self.scene.hemisphere_light() {
            ctx.light.update(&ctx.queue, light);
        }

        // Anything attached since the last frame (the loaded model) gets
        // its GPU buffers here.
        if let Err(e) = self
            .scene
            .upload_pending(&ctx.device, &ctx.queue, &ctx.material_layout)
        {
            log::error!("failed to upload scene geometry: {}", e);
        }

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            render_pass.set_pipeline(&self.ctx.mesh_pipeline);
            for draw in self.scene.draws() {
                render_pass.draw_primitive(
                    draw.primitive,
                    draw.instances,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// The teardown contract: cancel the render loop, cancel the in-flight
    /// load, release the orbit controller. The owner drops the state
    /// afterwards, which is what unhooks the window event handlers.
    fn teardown(&mut self) {
        if self.frame_loop.cancel() {
            log::debug!("revoked scheduled render frame");
        }
        self.load_token.cancel();
        self.ctx.camera.controller.release();
    }
}

/// Messages re-entering the event loop from async work.
#[derive(Debug)]
pub(crate) enum ViewerEvent {
    /// Deferred init handoff (the wasm path cannot block in `resumed`).
    Initialized(ViewerState),
    Loaded(MeshNode),
    LoadFailed(anyhow::Error),
}

pub struct Viewer {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<ViewerEvent>,
    state: Option<ViewerState>,
    model_path: String,
    started: bool,
}

impl Viewer {
    fn new(event_loop: &EventLoop<ViewerEvent>, model_path: &str) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            model_path: model_path.to_string(),
            started: false,
        }
    }

    /// Start the asynchronous model load, exactly once per mount.
    ///
    /// The task owns a clone of the state's cancel token; completion comes
    /// back through the event loop proxy, and a completion that races
    /// teardown is dropped silently.
    fn spawn_load(&mut self) {
        let token = match &self.state {
            Some(state) => state.load_token.clone(),
            None => return,
        };
        let proxy = self.proxy.clone();
        let path = self.model_path.clone();

        let load_future = async move {
            let result = resources::load_model_gltf(&path, &token, &mut |loaded, total| {
                log::info!("model load progress: {} / {} bytes", loaded, total);
            })
            .await;

            if token.is_cancelled() {
                log::debug!("model load finished after teardown, dropping result");
                return;
            }
            let event = match result {
                Ok(node) => ViewerEvent::Loaded(node),
                Err(e) => ViewerEvent::LoadFailed(e),
            };
            if proxy.send_event(event).is_err() {
                log::debug!("event loop closed before the model load completed");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load_future);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load_future);
    }
}

impl ApplicationHandler<ViewerEvent> for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("harborview");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        let init_future = ViewerState::new(window);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = match self.async_runtime.block_on(init_future) {
                Ok(state) => state,
                Err(e) => panic!("viewer initialization failed: {}", e),
            };
            self.state = Some(state);
            self.spawn_load();
            if let Some(state) = &self.state {
                state.ctx.window.request_redraw();
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = init_future.await.unwrap_throw();
                assert!(proxy.send_event(ViewerEvent::Initialized(state)).is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized(mut state) => {
                // This is the message from our wasm `spawn_local`.
                // Trigger a resize and the first redraw now that we exist.
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.spawn_load();
            }
            ViewerEvent::Loaded(node) => {
                let state = match &mut self.state {
                    Some(state) => state,
                    None => {
                        log::debug!("model arrived after teardown, dropping it");
                        return;
                    }
                };
                if state.load_token.is_cancelled() {
                    log::debug!("model arrived after teardown, dropping it");
                    return;
                }
                log::info!("model loaded ({} nodes)", node.descendant_count());
                state.scene.attach_model(node);
            }
            ViewerEvent::LoadFailed(error) => {
                // Non-fatal: the rest of the scene keeps rendering.
                log::error!("model loading error: {:#}", error);
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.mouse_pressed {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => {
                state.teardown();
                self.state = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                state.mouse_pressed = button_state.is_pressed();
            }
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                if state.frame_loop.arm() {
                    state.ctx.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Run the viewer with the default model.
pub fn run() -> Result<()> {
    run_with_model(DEFAULT_MODEL_PATH)
}

/// Run the viewer for a specific model asset (a path under `assets/`).
pub fn run_with_model(model_path: &str) -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut viewer = Viewer::new(&event_loop, model_path);

    event_loop.run_app(&mut viewer)?;

    Ok(())
}
