use std::cell::RefCell;
use std::rc::Rc;

use blitkit::canvas::Color;
use blitkit::engine::*;
use blitkit::entity::Entity;
use blitkit::error::{ConfigError, EngineError, Result};
use blitkit::input::KeyCode;
use blitkit::scene::{QUIT, Scene, SceneAction, SceneRef};

fn headless() -> App {
    App::builder().with_audio(false).show_fps(false).build().unwrap()
}

/// Scene that logs every key it sees and follows a scripted reply.
struct Scripted {
    seen: Rc<RefCell<Vec<Option<KeyCode>>>>,
    on_enter: Option<SceneAction>,
}

impl Scripted {
    fn new(seen: &Rc<RefCell<Vec<Option<KeyCode>>>>) -> Self {
        Self { seen: Rc::clone(seen), on_enter: None }
    }
}

impl Scene for Scripted {
    fn update(&mut self, _ctx: &mut Context, key: Option<KeyCode>) -> Result<SceneAction> {
        self.seen.borrow_mut().push(key);
        if key == Some(KeyCode::Enter) {
            if let Some(action) = self.on_enter.take() {
                return Ok(action);
            }
        }
        Ok(SceneAction::None)
    }
}

// -- registry -------------------------------------------------------------

#[test]
fn quit_scene_is_preregistered() {
    let app = headless();
    assert_eq!(app.scene_count(), 1);
    assert_eq!(app.get_scene(&QUIT.into()).unwrap(), app.quit_scene());
    assert_eq!(app.scene_name(app.quit_scene()), Some(QUIT));
}

#[test]
fn duplicate_scene_names_are_rejected() {
    let mut app = headless();
    let seen = Rc::default();
    app.register_scene("level", Scripted::new(&seen)).unwrap();
    let err = app.register_scene("level", Scripted::new(&seen)).err();
    assert!(matches!(
        err,
        Some(EngineError::Config(ConfigError::DuplicateScene(name))) if name == "level"
    ));
    assert!(app.register_scene(QUIT, Scripted::new(&seen)).is_err());
}

#[test]
fn unknown_scene_name_is_reported() {
    let mut app = headless();
    assert!(matches!(app.get_scene(&"missing".into()), Err(EngineError::SceneNotFound(n)) if n == "missing"));
    assert!(matches!(app.play_scene("missing", true), Err(EngineError::SceneNotFound(_))));
    assert_eq!(app.active_scene(), None);
}

#[test]
fn handle_from_another_app_is_invalid() {
    let mut other = headless();
    let seen = Rc::default();
    other.register_scene("a", Scripted::new(&seen)).unwrap();
    let foreign = other.register_scene("b", Scripted::new(&seen)).unwrap();

    let app = headless();
    let err = app.get_scene(&SceneRef::from(foreign));
    assert!(matches!(err, Err(EngineError::InvalidHandle { kind: "scene", .. })));
}

#[test]
fn unnamed_scenes_resolve_by_handle() {
    let mut app = headless();
    let seen = Rc::default();
    let id = app.add_scene(Scripted::new(&seen));
    assert_eq!(app.play_scene(id, true).unwrap(), id);
    assert_eq!(app.scene_name(id), None);
}

#[test]
fn context_resolves_scenes_like_the_app() {
    let mut app = headless();
    let seen = Rc::default();
    let named = app.register_scene("named", Scripted::new(&seen)).unwrap();
    let unnamed = app.add_scene(Scripted::new(&seen));
    let ctx = app.context();
    assert_eq!(ctx.get_scene(&"named".into()).unwrap(), named);
    assert_eq!(ctx.get_scene(&SceneRef::from(unnamed)).unwrap(), unnamed);
    assert_eq!(ctx.get_scene(&QUIT.into()).unwrap(), app.quit_scene());
    assert!(matches!(ctx.get_scene(&"missing".into()), Err(EngineError::SceneNotFound(_))));
}

#[test]
fn unknown_sound_is_reported() {
    let app = headless();
    assert!(matches!(app.get_sound("missing"), Err(EngineError::SoundNotFound(n)) if n == "missing"));
}

// -- loop -----------------------------------------------------------------

#[test]
fn start_needs_a_first_scene() {
    let mut app = headless();
    let err = app.start().err();
    assert!(matches!(err, Some(EngineError::Config(ConfigError::NoFirstScene))));
    assert!(!app.is_running());
}

#[test]
fn first_scene_may_be_registered_after_it_is_named() {
    let mut app = headless();
    app.set_first_scene("late");
    let seen = Rc::default();
    let late = app.register_scene("late", Scripted::new(&seen)).unwrap();
    assert_eq!(app.start().unwrap(), late);
    assert!(app.is_running());
}

#[test]
fn tick_without_active_scene_fails() {
    let mut app = headless();
    app.set_first_scene("missing");
    assert!(app.start().is_err());
    assert!(matches!(app.tick(None), Err(EngineError::NoActiveScene)));
}

#[test]
fn each_tick_hands_one_key_to_the_active_scene() {
    let mut app = headless();
    let seen = Rc::default();
    app.register_scene("s", Scripted::new(&seen)).unwrap();
    app.set_first_scene("s");
    app.start().unwrap();

    app.tick(Some(KeyCode::KeyA)).unwrap();
    app.tick(None).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(KeyCode::KeyA), None]);
    assert_eq!(app.context().tick(), 2);
}

#[test]
fn step_takes_the_first_pending_press() {
    let mut app = headless();
    let seen = Rc::default();
    app.register_scene("s", Scripted::new(&seen)).unwrap();
    app.set_first_scene("s");
    app.start().unwrap();

    let input = &mut app.context_mut().input;
    input.key_down(KeyCode::ArrowLeft);
    input.key_down(KeyCode::ArrowRight);
    app.step().unwrap();
    app.step().unwrap();
    assert_eq!(*seen.borrow(), vec![Some(KeyCode::ArrowLeft), None]);
}

#[test]
fn scene_action_switches_scene() {
    let mut app = headless();
    let seen = Rc::default();
    let mut first = Scripted::new(&seen);
    first.on_enter = Some(SceneAction::play("second"));
    app.register_scene("first", first).unwrap();
    let second = app.register_scene("second", Scripted::new(&seen)).unwrap();
    app.set_first_scene("first");
    app.start().unwrap();

    app.tick(Some(KeyCode::Enter)).unwrap();
    assert_eq!(app.active_scene(), Some(second));
}

#[test]
fn action_to_missing_scene_is_an_error() {
    let mut app = headless();
    let seen = Rc::default();
    let mut first = Scripted::new(&seen);
    first.on_enter = Some(SceneAction::play("nowhere"));
    app.register_scene("first", first).unwrap();
    app.set_first_scene("first");
    app.start().unwrap();
    assert!(matches!(app.tick(Some(KeyCode::Enter)), Err(EngineError::SceneNotFound(_))));
}

#[test]
fn quit_scene_stops_the_app() {
    let mut app = headless();
    let seen = Rc::default();
    let mut first = Scripted::new(&seen);
    first.on_enter = Some(SceneAction::quit());
    app.register_scene("first", first).unwrap();
    app.set_first_scene("first");
    app.start().unwrap();

    app.tick(Some(KeyCode::Enter)).unwrap();
    assert!(app.is_running());
    app.tick(None).unwrap();
    assert!(!app.is_running());

    // a stopped app ignores further ticks
    let ticks = app.context().tick();
    app.tick(None).unwrap();
    assert_eq!(app.context().tick(), ticks);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn request_quit_stops_the_app_after_the_tick() {
    let mut app = headless();
    let seen = Rc::default();
    app.register_scene("s", Scripted::new(&seen)).unwrap();
    app.set_first_scene("s");
    app.start().unwrap();

    app.context_mut().request_quit();
    assert!(app.context().quit_requested());
    assert!(app.is_running());
    app.tick(None).unwrap();
    assert!(!app.is_running());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn dead_entities_are_compacted_each_tick() {
    let mut app = headless();
    let seen = Rc::default();
    app.register_scene("s", Scripted::new(&seen)).unwrap();
    app.set_first_scene("s");
    app.start().unwrap();

    let world = &mut app.context_mut().world;
    let id = world.spawn(Entity::builder().with_fill(Color::RED, 4, 4)).unwrap();
    world.kill(id);
    app.tick(None).unwrap();
    assert!(!app.context().world.contains(id));
}

// -- context --------------------------------------------------------------

#[test]
fn fps_averages_recorded_frames() {
    let mut app = headless();
    let ctx = app.context_mut();
    assert_eq!(ctx.fps(), 0.0);
    for _ in 0..FPS_WINDOW + 10 {
        ctx.record_frame(0.02);
    }
    assert!((ctx.fps() - 50.0).abs() < 0.01);
}

#[test]
fn fps_overlay_is_drawn_when_enabled() {
    let mut app = App::builder().with_audio(false).show_fps(true).build().unwrap();
    let seen = Rc::default();
    app.register_scene("s", Scripted::new(&seen)).unwrap();
    app.set_first_scene("s");
    app.start().unwrap();
    app.context_mut().canvas.fill(Color::WHITE);
    app.tick(None).unwrap();
    let bg = app.context().canvas.pixel(FPS_POS.x as u32, FPS_POS.y as u32);
    assert_eq!(bg, Some(Color::BLACK));
}

#[test]
fn text_is_cached_by_content_and_colour() {
    let mut app = headless();
    let ctx = app.context_mut();
    let a = ctx.text("HELLO", None, None);
    let b = ctx.text("HELLO", None, None);
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    ctx.text("HELLO", Some(Color::RED), None);
    assert_eq!(ctx.texts.len(), 2);
}

#[test]
fn screen_size_follows_config() {
    let app = App::builder().with_size(640, 480).with_audio(false).build().unwrap();
    assert_eq!(app.context().screen_size(), glam::IVec2::new(640, 480));
    assert_eq!(app.context().canvas.width(), 640);
}

#[test]
fn audio_disabled_app_has_no_device() {
    let app = headless();
    assert!(!app.context().audio.is_available());
    assert_eq!(app.context().audio.current_music(), None);
}

#[test]
fn builder_validates_config() {
    let err = App::builder().with_framerate(0).with_audio(false).build().err();
    assert!(matches!(err, Some(EngineError::Config(ConfigError::InvalidFramerate))));
}
