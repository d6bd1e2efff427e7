use std::path::PathBuf;

use thiserror::Error;

use crate::world::EntityId;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Misconfiguration detected while building engine objects.  Always fatal
/// for the object being built; nothing is partially constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("menu has {names} labels but {targets} targets; they must be the same length")]
    MenuLengthMismatch { names: usize, targets: usize },
    #[error("menu has no entries")]
    EmptyMenu,
    #[error("entity needs either an image or a fill colour and size")]
    MissingVisual,
    #[error("run directory '{}' does not exist", .0.display())]
    RunDirNotFound(PathBuf),
    #[error("a scene named '{0}' is already registered")]
    DuplicateScene(String),
    #[error("no first scene was set before starting the app")]
    NoFirstScene,
    #[error("framerate must be greater than zero")]
    InvalidFramerate,
    #[error("screen size {width}x{height} is invalid")]
    InvalidSize { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scene '{0}' not found in the scene registry")]
    SceneNotFound(String),
    #[error("sound '{0}' not found in the sound registry")]
    SoundNotFound(String),
    /// A handle that was not issued by the registry it is resolved against.
    #[error("{kind} handle #{index} does not belong to this registry")]
    InvalidHandle { kind: &'static str, index: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load image '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to load sound '{}': {reason}", path.display())]
    Sound { path: PathBuf, reason: String },
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed config file or font glyph map.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entity {0:?} is not alive")]
    EntityNotFound(EntityId),
    #[error("no scene is active")]
    NoActiveScene,
    #[error("failed to create window: {0}")]
    CreateWindow(#[source] winit::error::OsError),
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("renderer: {0}")]
    Renderer(String),
}
