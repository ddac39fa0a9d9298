//! Application event loop.
//!
//! [`App`] implements winit's `ApplicationHandler`. Once a window exists it
//! builds the [`AppState`], which owns every GPU resource and all scene state,
//! and starts the asset loads. Each load is its own future; its result comes
//! back to the event loop as an [`AppEvent`] and is applied there, so the
//! scene is only ever touched on the event loop thread.
//!
//! # Frame
//!
//! Each redraw:
//! 1. Derive the [`FramePose`] from the elapsed time
//! 2. Apply it to the world, the lights and the offscreen hearts
//! 3. Run the debug panel, which may edit the lights
//! 4. Upload camera, lights and instance transforms
//! 5. Render the spot light's shadow map
//! 6. Render the hearts into their texture
//! 7. Render skybox, scene, (natively) the progress overlay and the panel
//! 8. Present and request the next redraw

use std::{fmt::Debug, iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::{
    camera::CameraResources,
    config::{Config, ShadowConfig},
    context::Context,
    data_structures::{
        environment::{Background, Fog, Skybox},
        model::Model,
        texture::Texture,
    },
    frame::{FrameClock, FramePose, StopHandle, pose_at},
    gui::{DebugPanel, is_toggle_key},
    lights::{LightRig, LightingResources},
    offscreen::OffscreenScene,
    pipelines::{
        overlay::Overlay,
        ui::{UiPainter, UiScreen},
    },
    render::{draw_depth, draw_opaque},
    resources::{
        AssetSource,
        load_model_obj,
        loading::{Finished, LoadProgress, LoadingManager, ProgressBar},
        texture::{load_cube_texture, load_texture},
    },
    world::{ModelKind, SKYBOX_FACES, TextureSlot, World},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Results delivered to the event loop.
pub enum AppEvent {
    /// The web builds its state asynchronously and hands it over with this.
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<anyhow::Result<AppState>>),
    Texture {
        slot: TextureSlot,
        result: anyhow::Result<Texture>,
    },
    Skybox(anyhow::Result<Texture>),
    Model {
        kind: ModelKind,
        result: anyhow::Result<Model>,
    },
}

impl Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Texture { slot, result } => f
                .debug_struct("Texture")
                .field("slot", slot)
                .field("ok", &result.is_ok())
                .finish(),
            Self::Skybox(result) => f.debug_tuple("Skybox").field(&result.is_ok()).finish(),
            Self::Model { kind, result } => f
                .debug_struct("Model")
                .field("kind", kind)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

impl AppEvent {
    /// Only the texture slots are tracked by the loading manager.
    pub fn finished(&self) -> Finished<'_> {
        match self {
            Self::Texture { slot, result: Ok(_) } => Finished::Loaded(slot.url()),
            Self::Texture { slot, result: Err(e) } => Finished::Failed(slot.url(), e),
            _ => Finished::Untracked,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
type Load = futures::future::BoxFuture<'static, AppEvent>;
#[cfg(target_arch = "wasm32")]
type Load = futures::future::LocalBoxFuture<'static, AppEvent>;

/// Everything that exists once the window has a device.
pub struct AppState {
    pub(crate) ctx: Context,
    camera: CameraResources,
    rig: LightRig,
    lighting: LightingResources,
    panel: DebugPanel,
    ui: egui_winit::State,
    ui_painter: UiPainter,
    offscreen: OffscreenScene,
    world: World,
    loading: LoadingManager,
    progress: ProgressBar,
    overlay: Overlay,
    #[cfg(target_arch = "wasm32")]
    dom: crate::dom::ProgressDom,
    source: AssetSource,
    shadows: ShadowConfig,
    clock: FrameClock,
    is_surface_configured: bool,
}

impl AppState {
    pub async fn new(window: Arc<Window>, config: &Config) -> anyhow::Result<Self> {
        #[cfg(target_arch = "wasm32")]
        let dom = crate::dom::ProgressDom::new(&config.loading_selector, &config.progress_selector)?;

        let ctx = Context::new(window).await?;
        let camera = CameraResources::from_config(
            &ctx.device,
            &ctx.layouts.camera,
            &config.camera,
            ctx.config.width,
            ctx.config.height,
        );

        let fog = Fog::new(config.fog.color, config.fog.near, config.fog.far);
        let rig = LightRig::garden();
        let lighting = LightingResources::new(&ctx.device, &ctx.layouts, &rig, Some(&fog), &config.shadows, "garden");
        let panel = DebugPanel::for_lights();
        let ui = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::ROOT,
            &*ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
            Some(ctx.device.limits().max_texture_dimension_2d as usize),
        );
        let ui_painter = UiPainter::new(&ctx.device, ctx.config.format);

        let offscreen = OffscreenScene::new(&ctx.device, &ctx.layouts, &ctx.placeholders);
        let world = World::build(
            &ctx.device,
            &ctx.layouts,
            &ctx.placeholders,
            offscreen.texture(),
            Some(fog),
        );

        let progress = ProgressBar::new();
        let mut overlay = Overlay::new(&ctx.device);
        overlay.update(&ctx.queue, &progress);
        log::info!(
            "scene ready with {} pagodas, loading assets from {}",
            world.pagoda_count(),
            config.asset_root.display()
        );

        Ok(Self {
            ctx,
            camera,
            rig,
            lighting,
            panel,
            ui,
            ui_painter,
            offscreen,
            world,
            loading: LoadingManager::new(),
            progress,
            overlay,
            #[cfg(target_arch = "wasm32")]
            dom,
            source: AssetSource::new(config.asset_root.clone()),
            shadows: config.shadows,
            clock: FrameClock::new(),
            is_surface_configured: false,
        })
    }

    /// Registers the tracked textures with the loading manager and returns one future per asset.
    fn start_loads(&mut self) -> Vec<Load> {
        let mut loads: Vec<Load> = Vec::new();
        for slot in TextureSlot::ALL {
            self.loading.item_start(slot.url());
            let (source, device, queue) = (self.source.clone(), self.ctx.device.clone(), self.ctx.queue.clone());
            loads.push(Box::pin(async move {
                let result = load_texture(&source, slot.url(), slot.sampling(), slot.is_normal_map(), &device, &queue).await;
                AppEvent::Texture { slot, result }
            }));
        }

        let (source, device, queue) = (self.source.clone(), self.ctx.device.clone(), self.ctx.queue.clone());
        loads.push(Box::pin(async move {
            AppEvent::Skybox(load_cube_texture(&source, &SKYBOX_FACES, &device, &queue).await)
        }));

        for kind in [ModelKind::Balloon, ModelKind::Tree] {
            let (source, device, queue) = (self.source.clone(), self.ctx.device.clone(), self.ctx.queue.clone());
            let layout = self.ctx.layouts.material.clone();
            loads.push(Box::pin(async move {
                let result = load_model_obj(&source, kind.url(), &device, &queue, &layout).await;
                AppEvent::Model { kind, result }
            }));
        }
        loads
    }

    fn show_progress(&mut self, progress: LoadProgress) {
        self.overlay.update(&self.ctx.queue, &self.progress);
        #[cfg(target_arch = "wasm32")]
        self.dom.show(&self.progress);
        if progress.is_complete() {
            log::info!(
                "textures loaded ({} of {} failed)",
                self.loading.failed().len(),
                progress.items_total
            );
        }
    }

    fn handle_asset(&mut self, event: AppEvent) {
        if let Some(progress) = self.loading.finish(&mut self.progress, event.finished()) {
            self.show_progress(progress);
        }
        match event {
            #[cfg(target_arch = "wasm32")]
            AppEvent::Initialized(_) => {}
            AppEvent::Texture { slot, result: Ok(texture) } => {
                self.world.apply_texture(slot, texture, &self.ctx.device, &self.ctx.queue);
            }
            AppEvent::Texture { result: Err(_), .. } => {}
            AppEvent::Skybox(Ok(texture)) => {
                let skybox = Skybox::new(&self.ctx.device, &self.ctx.layouts.sky, texture);
                self.world.set_background(Background::Skybox(skybox));
                log::info!("skybox loaded");
            }
            AppEvent::Skybox(Err(e)) => log::warn!("skybox unavailable: {e:#}"),
            AppEvent::Model { kind, result } => match (kind, result) {
                (ModelKind::Balloon, Ok(_)) if self.world.has_balloons() => log::warn!("balloons already placed"),
                (ModelKind::Tree, Ok(_)) if self.world.has_tree() => log::warn!("tree already placed"),
                (ModelKind::Balloon, Ok(model)) => self.world.add_balloons(&self.ctx.device, &model),
                (ModelKind::Tree, Ok(model)) => self.world.add_tree(&self.ctx.device, model),
                (kind, Err(e)) => log::warn!("{} unavailable: {e:#}", kind.url()),
            },
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.camera.projection.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn window_event(&mut self, event: &WindowEvent) {
        let response = self.ui.on_window_event(&self.ctx.window, event);
        if is_toggle_key(event) {
            self.panel.toggle();
            return;
        }
        if response.consumed {
            return;
        }
        let height = self.ctx.config.height as f32;
        self.camera
            .controller
            .handle_window_event(event, &self.camera.camera, &self.camera.projection, height);
    }

    /// Moves everything animated to where it is at `pose`.
    pub fn apply_pose(&mut self, pose: &FramePose) {
        self.world.animate(pose);
        self.rig.animate(pose);
        self.offscreen.animate(pose);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let pose = pose_at(self.clock.elapsed_millis());
        self.apply_pose(&pose);

        let ui_ctx = self.ui.egui_ctx().clone();
        let ui_input = self.ui.take_egui_input(&self.ctx.window);
        let (panel, rig) = (&self.panel, &mut self.rig);
        let ui_output = ui_ctx.run(ui_input, |ctx| {
            if panel.ui(ctx, rig) {
                log::debug!("lights edited from the debug panel");
            }
        });
        self.ui
            .handle_platform_output(&self.ctx.window, ui_output.platform_output);
        let primitives = ui_ctx.tessellate(ui_output.shapes, ui_output.pixels_per_point);
        let screen = UiScreen {
            size_in_pixels: [self.ctx.config.width, self.ctx.config.height],
            pixels_per_point: ui_output.pixels_per_point,
        };

        let (device, queue) = (&self.ctx.device, &self.ctx.queue);
        self.ui_painter
            .update_textures(device, queue, &ui_output.textures_delta);
        self.ui_painter.prepare(device, queue, &primitives, &screen);
        self.camera.update(queue);
        self.lighting
            .update(queue, &self.rig, self.world.scene.fog.as_ref(), &self.shadows);
        self.world.update(device, queue);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let batches = self.world.scene.get_render().into_batches();
        let pipelines = &self.ctx.pipelines;

        if self.lighting.casts_shadows() {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.lighting.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            draw_depth(
                &mut shadow_pass,
                &pipelines.shadow,
                &batches,
                &self.lighting.shadow_camera_bind_group,
            );
        }

        self.offscreen.render(device, queue, &mut encoder);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.world.scene.background.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
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
                multiview_mask: None,
            });

            if let Some(skybox) = self.world.scene.background.skybox() {
                render_pass.set_pipeline(&pipelines.sky);
                render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &skybox.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
            draw_opaque(
                &mut render_pass,
                &pipelines.phong,
                &batches,
                &self.camera.bind_group,
                &self.lighting.bind_group,
            );
            #[cfg(not(target_arch = "wasm32"))]
            self.overlay.draw(&mut render_pass, &pipelines.overlay);
            self.ui_painter.draw(&mut render_pass);
        }

        queue.submit(iter::once(encoder.finish()));
        output.present();
        self.ui_painter.free_textures(&ui_output.textures_delta.free);
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AppEvent>,
    config: Config,
    state: Option<AppState>,
    initializing: bool,
    stop: StopHandle,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: Config, stop: StopHandle) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            initializing: false,
            stop,
            error: None,
        })
    }

    fn spawn_loads(&self, loads: Vec<Load>) {
        for load in loads {
            let proxy = self.proxy.clone();
            let deliver = async move {
                let event = load.await;
                if proxy.send_event(event).is_err() {
                    log::warn!("event loop closed before an asset finished loading");
                }
            };
            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(deliver);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(deliver);
        }
    }

    fn install(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        let loads = state.start_loads();
        self.spawn_loads(loads);
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("start-up failed: {error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Arc<Window>> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.config.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = crate::dom::canvas(&self.config.canvas_id)?;
            window_attributes = window_attributes.with_canvas(Some(canvas));
        }

        Ok(Arc::new(event_loop.create_window(window_attributes)?))
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.initializing {
            return;
        }
        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };
        self.initializing = true;

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window, &self.config)) {
                Ok(state) => self.install(state),
                Err(e) => self.fail(event_loop, e),
            }
            self.initializing = false;
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window, &config).await;
                if proxy.send_event(AppEvent::Initialized(Box::new(state))).is_err() {
                    log::error!("event loop closed during start-up");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            AppEvent::Initialized(state) => {
                self.initializing = false;
                match *state {
                    Ok(state) => self.install(state),
                    Err(e) => self.fail(event_loop, e),
                }
            }
            event => {
                if let Some(state) = &mut self.state {
                    state.handle_asset(event);
                }
            }
        }
        if self.stop.is_stopped() {
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: winit::window::WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.window_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.stop.stop(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => log::error!("Unable to render {}", e),
            },
            _ => {}
        }

        if self.stop.is_stopped() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.stop.is_stopped() {
            event_loop.exit();
        }
    }
}

fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }
}

/// Opens the garden and runs until the window closes or Escape is pressed.
pub fn run(config: Config) -> anyhow::Result<()> {
    run_until_stopped(config, StopHandle::new())
}

/// Like [`run`], but the loop also ends once `stop` is triggered from elsewhere.
pub fn run_until_stopped(config: Config, stop: StopHandle) -> anyhow::Result<()> {
    init_logging();

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, stop)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(Config::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
