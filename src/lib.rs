pub mod assets;
pub mod audio;
pub mod canvas;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod input;
pub mod menu;
pub mod registry;
pub mod renderer;
pub mod scene;
pub mod team;
pub mod text;
pub mod window;
pub mod world;

pub use canvas::Color;
pub use config::AppConfig;
pub use engine::{App, AppBuilder, Context};
pub use entity::{Entity, EntityBuilder, HitBudget};
pub use error::{ConfigError, EngineError, Result};
pub use input::KeyCode;
pub use menu::Menu;
pub use scene::{Scene, SceneAction, SceneId, SceneRef};
pub use world::{EntityId, World};
