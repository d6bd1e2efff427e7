use crate::engine::Context;
use crate::error::Result;
use crate::input::KeyCode;
use crate::registry::{Handle, Ref};

/// Handle to a scene registered with an [`App`](crate::engine::App).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(usize);

impl Handle for SceneId {
    const KIND: &'static str = "scene";
    fn from_index(index: usize) -> Self { SceneId(index) }
    fn index(self) -> usize { self.0 }
}

/// A scene given by registry name or by handle.
pub type SceneRef = Ref<SceneId>;

impl From<SceneId> for SceneRef {
    fn from(id: SceneId) -> Self {
        Ref::Handle(id)
    }
}

/// Name under which the built-in quit scene is registered.
pub const QUIT: &str = "QUIT";

pub enum SceneAction {
    None,
    /// Make `target` the active scene.  With `run_ready` its ready hook
    /// runs first.
    Play { target: SceneRef, run_ready: bool },
}

impl SceneAction {
    /// Switch to `target`, running its ready hook.
    pub fn play(target: impl Into<SceneRef>) -> Self {
        SceneAction::Play { target: target.into(), run_ready: true }
    }

    /// Switch to `target` without running its ready hook.
    pub fn resume(target: impl Into<SceneRef>) -> Self {
        SceneAction::Play { target: target.into(), run_ready: false }
    }

    pub fn quit() -> Self {
        Self::play(QUIT)
    }
}

/// A named mode of the application.
///
/// `ready` runs each time the scene is activated through a transition that
/// asks for it.  `update` runs once per tick while the scene is active and
/// receives the key pressed during that tick, if any.  Nothing is called on
/// the scene being left.
pub trait Scene {
    fn ready(&mut self, _ctx: &mut Context) -> Result<()> { Ok(()) }
    fn update(&mut self, ctx: &mut Context, key: Option<KeyCode>) -> Result<SceneAction>;
}

/// Terminal scene: the tick after it becomes active, the app stops.
#[derive(Debug, Default)]
pub struct SceneQuit;

impl Scene for SceneQuit {
    fn update(&mut self, ctx: &mut Context, _key: Option<KeyCode>) -> Result<SceneAction> {
        ctx.request_quit();
        Ok(SceneAction::None)
    }
}
