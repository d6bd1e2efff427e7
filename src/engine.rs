use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::IVec2;
use rand::Rng;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use crate::assets::{Assets, ImageHandle};
use crate::audio::{AudioContext, SoundId, SoundRef};
use crate::canvas::{Canvas, Color};
use crate::config::AppConfig;
use crate::error::{ConfigError, EngineError, Result};
use crate::input::{InputState, KeyCode};
use crate::registry::{Handle, Registry, ResolveError};
use crate::renderer::Renderer;
use crate::scene::{QUIT, Scene, SceneAction, SceneId, SceneQuit, SceneRef};
use crate::text::{Font, TextCache};
use crate::world::World;

/// Number of recent frames the FPS counter averages over.
pub const FPS_WINDOW: usize = 60;
/// Where the FPS counter is drawn.
pub const FPS_POS: IVec2 = IVec2::new(5, 5);

// ── Context ─────────────────────────────────────────────────────────────────

/// Everything a scene may touch during its turn: the entity world, the frame
/// being drawn, assets, audio and input.
pub struct Context {
    pub config: AppConfig,
    pub world: World,
    pub audio: AudioContext,
    pub assets: Assets,
    pub canvas: Canvas,
    pub input: InputState,
    pub texts: TextCache,
    /// Font used by [`Context::text`] and the default menu.
    pub font: Font,
    /// Names and handles of every registered scene, mirrored by [`App`].
    scene_index: Registry<SceneId, ()>,
    quit_requested: bool,
    frame_times: VecDeque<f32>,
    tick: u64,
}

impl Context {
    fn new(config: AppConfig) -> Self {
        let assets = Assets::new(
            config.asset_dir(),
            &config.image_subdir,
            &config.sound_subdir,
            &config.font_subdir,
        );
        let audio = AudioContext::new(config.audio);
        log::info!("audio: {}", if audio.is_available() { "device ready" } else { "disabled" });
        Self {
            world: World::new(config.width, config.height),
            audio,
            canvas: Canvas::new(config.width, config.height),
            input: InputState::new(),
            texts: TextCache::new(),
            font: Font::builtin(),
            assets,
            scene_index: Registry::new(),
            quit_requested: false,
            frame_times: VecDeque::with_capacity(FPS_WINDOW),
            tick: 0,
            config,
        }
    }

    /// Stop the app at the end of the current tick.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool { self.quit_requested }

    /// Resolve a scene by name or handle without touching the scene itself.
    pub fn get_scene(&self, target: &SceneRef) -> Result<SceneId> {
        self.scene_index.resolve(target).map_err(|e| match e {
            ResolveError::UnknownName(name) => EngineError::SceneNotFound(name),
            ResolveError::ForeignHandle(index) => EngineError::InvalidHandle { kind: SceneId::KIND, index },
        })
    }

    /// Ticks completed since the app started.
    pub fn tick(&self) -> u64 { self.tick }

    pub fn screen_size(&self) -> IVec2 { self.world.screen() }

    // -- text -----------------------------------------------------------------

    /// Cached bitmap of `content` in the current font.
    pub fn text(&mut self, content: &str, color: Option<Color>, background: Option<Color>) -> ImageHandle {
        self.texts.text(&self.font, content, color, background)
    }

    pub fn draw_text(&mut self, content: &str, pos: IVec2, color: Option<Color>, background: Option<Color>) {
        let rendered = self.text(content, color, background);
        self.canvas.blit(&rendered, pos);
    }

    /// Switch the default font.  Cached text is dropped.
    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.texts.clear();
    }

    // -- audio ----------------------------------------------------------------

    /// Load `filename` from the sounds directory and register it.
    pub fn load_sound(&mut self, filename: &str, name: Option<&str>, volume: Option<f32>) -> Result<SoundId> {
        let path = self.assets.sound_path(filename);
        self.audio.load_sound(path, name, volume)
    }

    pub fn play_sound(&mut self, sound: impl Into<SoundRef>) -> Result<()> {
        self.audio.play(&sound.into())
    }

    pub fn play_music(&mut self, sound: impl Into<SoundRef>) -> Result<()> {
        self.audio.play_music(&sound.into())
    }

    // -- frame timing ---------------------------------------------------------

    /// Record the wall-clock length of one frame, in seconds.
    pub fn record_frame(&mut self, seconds: f32) {
        if self.frame_times.len() >= FPS_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(seconds);
    }

    /// Frames per second averaged over the last [`FPS_WINDOW`] frames.
    /// Zero until a frame has been recorded.
    pub fn fps(&self) -> f32 {
        let total: f32 = self.frame_times.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.frame_times.len() as f32 / total
    }

    fn draw_fps(&mut self) {
        let label = format!("{}", self.fps() as u32);
        let [r, g, b]: [u8; 3] = rand::thread_rng().r#gen();
        // Uncached: the colour changes every frame.
        self.canvas.draw_text(&self.font, &label, FPS_POS, Color::rgb(r, g, b), Some(Color::BLACK));
    }
}

// ── AppBuilder ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    pub fn with_title(mut self, title: &str) -> Self { self.config.title = title.into(); self }
    pub fn with_logo(mut self, filename: &str) -> Self { self.config.logo = Some(filename.into()); self }
    pub fn with_size(mut self, width: u32, height: u32) -> Self { self.config.width = width; self.config.height = height; self }
    pub fn with_framerate(mut self, framerate: u32) -> Self { self.config.framerate = framerate; self }
    pub fn show_fps(mut self, show: bool) -> Self { self.config.show_fps = show; self }
    pub fn with_run_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.config.run_dir = Some(dir.into()); self }
    pub fn with_audio(mut self, enabled: bool) -> Self { self.config.audio = enabled; self }
    /// Replace every setting made so far.
    pub fn with_config(mut self, config: AppConfig) -> Self { self.config = config; self }

    pub fn build(self) -> Result<App> {
        App::new(self.config)
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

/// Scene registry plus the active-scene dispatch.  Exactly one scene is
/// active once the app has started; every tick hands that scene the key of
/// the tick and then applies the transition it asked for.
pub struct App {
    ctx: Context,
    scenes: Registry<SceneId, Box<dyn Scene>>,
    quit: SceneId,
    first_scene: Option<SceneRef>,
    active: Option<SceneId>,
    running: bool,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let mut scenes: Registry<SceneId, Box<dyn Scene>> = Registry::new();
        let quit = scenes.insert(QUIT, Box::new(SceneQuit));
        let mut ctx = Context::new(config);
        ctx.scene_index.insert(QUIT, ());
        Ok(Self {
            ctx,
            scenes,
            quit,
            first_scene: None,
            active: None,
            running: false,
        })
    }

    pub fn context(&self) -> &Context { &self.ctx }
    pub fn context_mut(&mut self) -> &mut Context { &mut self.ctx }
    pub fn config(&self) -> &AppConfig { &self.ctx.config }

    // -- scene registry -------------------------------------------------------

    /// Register `scene` under `name`.  Names are unique.
    pub fn register_scene(&mut self, name: &str, scene: impl Scene + 'static) -> Result<SceneId> {
        if self.scenes.contains_name(name) {
            return Err(ConfigError::DuplicateScene(name.to_string()).into());
        }
        log::debug!("scene: registered '{name}'");
        self.ctx.scene_index.insert(name, ());
        Ok(self.scenes.insert(name, Box::new(scene)))
    }

    /// Register a scene reachable only through its handle.
    pub fn add_scene(&mut self, scene: impl Scene + 'static) -> SceneId {
        self.ctx.scene_index.push(());
        self.scenes.push(Box::new(scene))
    }

    pub fn get_scene(&self, target: &SceneRef) -> Result<SceneId> {
        self.ctx.get_scene(target)
    }

    pub fn scene_name(&self, id: SceneId) -> Option<&str> {
        self.scenes.name_of(id)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// The built-in terminal scene, registered as `"QUIT"`.
    pub fn quit_scene(&self) -> SceneId { self.quit }

    pub fn get_sound(&self, sound: impl Into<SoundRef>) -> Result<SoundId> {
        self.ctx.audio.get_sound(&sound.into())
    }

    // -- transitions ----------------------------------------------------------

    /// Make `target` the active scene, running its ready hook first when
    /// `run_ready` is set.  The scene being left is not notified.
    pub fn play_scene(&mut self, target: impl Into<SceneRef>, run_ready: bool) -> Result<SceneId> {
        let id = self.get_scene(&target.into())?;
        if run_ready {
            let scene = self
                .scenes
                .get_mut(id)
                .ok_or(EngineError::InvalidHandle { kind: SceneId::KIND, index: id.index() })?;
            scene.ready(&mut self.ctx)?;
        }
        self.active = Some(id);
        log::debug!("scene: -> '{}'", self.scenes.name_of(id).unwrap_or("<unnamed>"));
        Ok(id)
    }

    /// Scene activated by [`App::start`].  Resolved when the app starts, so
    /// it may name a scene registered later.
    pub fn set_first_scene(&mut self, target: impl Into<SceneRef>) {
        self.first_scene = Some(target.into());
    }

    pub fn active_scene(&self) -> Option<SceneId> { self.active }

    pub fn is_running(&self) -> bool { self.running }

    // -- loop -----------------------------------------------------------------

    /// Activate the first scene.  Called by [`App::run`]; public so the loop
    /// can be driven without a window.
    pub fn start(&mut self) -> Result<SceneId> {
        let first = self.first_scene.clone().ok_or(ConfigError::NoFirstScene)?;
        self.running = true;
        self.ctx.quit_requested = false;
        let cfg = &self.ctx.config;
        log::info!("app: starting '{}' ({}x{} @ {} fps)", cfg.title, cfg.width, cfg.height, cfg.framerate);
        self.play_scene(first, true)
    }

    /// One tick: dispatch `key` to the active scene, apply its transition,
    /// drop dead entities and draw the FPS overlay.  A stopped app ignores
    /// further ticks.
    pub fn tick(&mut self, key: Option<KeyCode>) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        let id = self.active.ok_or(EngineError::NoActiveScene)?;
        let scene = self
            .scenes
            .get_mut(id)
            .ok_or(EngineError::InvalidHandle { kind: SceneId::KIND, index: id.index() })?;
        let action = scene.update(&mut self.ctx, key)?;

        if let SceneAction::Play { target, run_ready } = action {
            self.play_scene(target, run_ready)?;
        }
        if self.ctx.quit_requested {
            log::info!("app: quit requested");
            self.running = false;
        }
        self.ctx.world.compact();
        if self.ctx.config.show_fps {
            self.ctx.draw_fps();
        }
        self.ctx.tick += 1;
        Ok(())
    }

    /// Tick with the first key pressed since the previous tick.
    pub fn step(&mut self) -> Result<()> {
        let key = self.ctx.input.take_key();
        self.tick(key)
    }

    /// Start the app and run the window loop until a quit.
    pub fn run(mut self) -> Result<()> {
        self.start()?;
        let icon = match self.ctx.config.logo.clone() {
            Some(logo) => Some(self.ctx.assets.load_image(&logo)?),
            None => None,
        };
        let event_loop = EventLoop::new()?;
        let frame = self.ctx.config.frame_duration();
        let mut runner = Runner {
            app: self,
            icon,
            renderer: None,
            frame,
            next_frame: Instant::now(),
            last_frame: None,
            error: None,
        };
        event_loop.run_app(&mut runner)?;
        runner.error.map_or(Ok(()), Err)
    }
}

// ── Runner (winit ApplicationHandler) ───────────────────────────────────────

struct Runner {
    app: App,
    icon: Option<ImageHandle>,
    renderer: Option<Renderer>,
    frame: Duration,
    next_frame: Instant,
    last_frame: Option<Instant>,
    error: Option<EngineError>,
}

impl Runner {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn open(&self, event_loop: &ActiveEventLoop) -> Result<Renderer> {
        let window = crate::window::create_window(event_loop, &self.app.ctx.config, self.icon.as_deref())?;
        pollster::block_on(Renderer::new(window, self.app.ctx.config.width, self.app.ctx.config.height))
    }

    /// Run one tick and present the frame.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now < self.next_frame {
            return;
        }
        if let Some(prev) = self.last_frame {
            self.app.ctx.record_frame(now.duration_since(prev).as_secs_f32());
        }
        self.last_frame = Some(now);
        self.next_frame += self.frame;
        if self.next_frame < now {
            self.next_frame = now + self.frame;
        }

        if let Err(e) = self.app.step() {
            self.fail(event_loop, e);
            return;
        }
        if !self.app.is_running() {
            event_loop.exit();
            return;
        }

        let Some(renderer) = self.renderer.as_mut() else { return };
        match renderer.present(&self.app.ctx.canvas) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("renderer: surface lost, reconfiguring");
                let size = renderer.window.inner_size();
                renderer.resize(size);
            }
            Err(e) => log::warn!("renderer: {e}"),
        }
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_ref() else { return };
        if Instant::now() >= self.next_frame {
            renderer.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.app.ctx.request_quit();
                self.app.running = false;
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, repeat, .. },
                ..
            } => match state {
                ElementState::Pressed if !repeat => self.app.ctx.input.key_down(code),
                ElementState::Pressed => {}
                ElementState::Released => self.app.ctx.input.key_up(code),
            },

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
