use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use log::{debug, error, info, trace};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::assets::AssetStore;
use crate::audio::{self, AudioSink};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::geometry::Rect;
use crate::graph::SceneGraph;
use crate::input::{self, PointerEvent, PointerInput, Touch, TouchPhase};
use crate::render::graphics::{create_graphics, Graphics};

const FRAME: Duration = Duration::from_micros(16_667);

/// Everything a scene can touch: the node tree and the assets behind it.
pub struct World {
    pub graph: SceneGraph,
    pub assets: AssetStore,
}

impl World {
    pub fn new(size: Vec2, assets: AssetStore) -> Self {
        Self {
            graph: SceneGraph::new(size),
            assets,
        }
    }

    /// Scene bounds, origin in the lower-left.
    pub fn bounds(&self) -> Rect {
        Rect::new(Vec2::ZERO, self.graph.size())
    }

    /// One frame: scene logic, then actions, then the sounds they emitted.
    pub fn advance<H: SceneHandler + ?Sized>(&mut self, handler: &mut H, dt: f32, audio: &mut dyn AudioSink) {
        handler.update(self, dt);
        self.graph.update(dt);
        for sound in self.graph.drain_sounds() {
            audio.play(&self.assets.sound_info(sound).path);
        }
    }

    /// Gives the scene a new size and tells the handler if it changed.
    pub fn resize<H: SceneHandler + ?Sized>(&mut self, handler: &mut H, size: Vec2) {
        let old = self.graph.size();
        if old == size {
            return;
        }
        self.graph.resize(size);
        handler.did_change_size(self, old);
    }

    /// Routes one input event to the matching handler method.
    pub fn dispatch<H: SceneHandler + ?Sized>(&mut self, handler: &mut H, event: PointerEvent) {
        trace!("{event:?}");
        match event {
            PointerEvent::Touch(touch) => {
                let touches = [touch];
                match touch.phase {
                    TouchPhase::Began => handler.touches_began(self, &touches),
                    TouchPhase::Moved => handler.touches_moved(self, &touches),
                    TouchPhase::Ended => handler.touches_ended(self, &touches),
                    TouchPhase::Cancelled => handler.touches_cancelled(self, &touches),
                }
            }
            PointerEvent::SecondaryPress(location) => handler.secondary_press(self, location),
        }
    }
}

/// Scene callbacks. All input arrives in scene coordinates.
pub trait SceneHandler {
    /// Called once the window exists and the scene has its final size.
    fn did_move(&mut self, world: &mut World) -> Result<()>;

    /// The scene was resized; `world.bounds()` already has the new size.
    fn did_change_size(&mut self, _world: &mut World, _old_size: Vec2) {}

    fn touches_began(&mut self, _world: &mut World, _touches: &[Touch]) {}

    fn touches_moved(&mut self, _world: &mut World, _touches: &[Touch]) {}

    fn touches_ended(&mut self, _world: &mut World, _touches: &[Touch]) {}

    fn touches_cancelled(&mut self, _world: &mut World, _touches: &[Touch]) {}

    fn secondary_press(&mut self, _world: &mut World, _location: Vec2) {}

    fn update(&mut self, _world: &mut World, _dt: f32) {}
}

enum State {
    Ready { gfx: Graphics, last_frame: Instant },
    Init,
}

pub struct App<H> {
    state: State,
    config: EngineConfig,
    world: World,
    handler: H,
    input: PointerInput,
    audio: Box<dyn AudioSink>,
    started: Instant,
    failure: Option<EngineError>,
}

impl<H: SceneHandler> App<H> {
    pub fn new(config: EngineConfig, handler: H) -> Self {
        let size = Vec2::new(config.width as f32, config.height as f32);
        let world = World::new(size, AssetStore::from_dir(config.asset_dir.clone()));
        let input = PointerInput::new(config.tap_tracker());
        let audio = audio::default_sink(config.audio);
        Self {
            state: State::Init,
            config,
            world,
            handler,
            input,
            audio,
            started: Instant::now(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let win_attr = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(win_attr)?);
        let gfx = pollster::block_on(create_graphics(window.clone()))?;

        let logical = window.inner_size().to_logical::<f32>(window.scale_factor());
        self.world.graph.resize(Vec2::new(logical.width, logical.height));
        self.handler.did_move(&mut self.world)?;
        info!("scene ready ({}x{})", logical.width, logical.height);

        gfx.request_redraw();
        self.state = State::Ready {
            gfx,
            last_frame: Instant::now(),
        };
        Ok(())
    }

    fn tick(&mut self) {
        if let State::Ready { gfx, last_frame } = &mut self.state {
            let now = Instant::now();
            let dt = now.duration_since(*last_frame).as_secs_f32();
            *last_frame = now;
            self.world.advance(&mut self.handler, dt, self.audio.as_mut());
            gfx.request_redraw();
        }
    }

    fn draw(&mut self) {
        if let State::Ready { gfx, .. } = &mut self.state {
            trace!("{} nodes to draw", self.world.graph.render_list().len());
            gfx.draw(&self.world);
        }
    }

    fn scene_point(&self, position: PhysicalPosition<f64>) -> Option<Vec2> {
        match &self.state {
            State::Ready { gfx, .. } => Some(input::to_scene(
                position,
                gfx.window().scale_factor(),
                self.world.graph.size().y,
            )),
            State::Init => None,
        }
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready { gfx, .. } = &mut self.state {
            gfx.resize(size);
            let logical = size.to_logical::<f32>(gfx.window().scale_factor());
            debug!("resized to {}x{}", logical.width, logical.height);
            self.world
                .resize(&mut self.handler, Vec2::new(logical.width, logical.height));
        }
    }

    fn dispatch(&mut self, event: Option<PointerEvent>) {
        if let Some(event) = event {
            self.world.dispatch(&mut self.handler, event);
        }
    }
}

impl<H: SceneHandler> ApplicationHandler for App<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let State::Init = self.state {
            if let Err(err) = self.start(event_loop) {
                error!("failed to start scene: {err}");
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let now = self.started.elapsed();
        match event {
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => self.draw(),
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(location) = self.scene_point(position) {
                    let event = self.input.cursor_moved(location);
                    self.dispatch(event);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                let event = self.input.cancel_mouse();
                self.dispatch(event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input.mouse_button(button, state, now);
                self.dispatch(event);
            }
            WindowEvent::Touch(touch) => {
                if let Some(location) = self.scene_point(touch.location) {
                    let touch = self.input.touch(touch.id, touch.phase, location, now);
                    self.dispatch(Some(PointerEvent::Touch(touch)));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.tick();
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME));
    }
}

fn init_logging(filter: &str) {
    // Allows the setting of the log level through RUST_LOG env var.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).try_init();
}

/// Owns the event loop and the scene it drives.
pub struct EngineContext<H> {
    event_loop: EventLoop<()>,
    app: App<H>,
}

impl<H: SceneHandler> EngineContext<H> {
    pub fn new(config: EngineConfig, handler: H) -> Result<Self> {
        init_logging(&config.log_filter);
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let app = App::new(config, handler);
        Ok(Self { event_loop, app })
    }

    /// Runs until the window closes. Startup failures inside the loop are
    /// returned once it has exited.
    pub fn run(self) -> Result<()> {
        let Self { event_loop, mut app } = self;
        event_loop.run_app(&mut app)?;
        match app.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
