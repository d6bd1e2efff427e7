use std::sync::Arc;

use image::RgbaImage;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Icon, Window, WindowAttributes};

use crate::config::AppConfig;
use crate::error::{EngineError, Result};

/// Attributes of the game window: configured title, fixed inner size in
/// physical pixels, not resizable, and `icon` when given.
///
/// An icon whose pixel data winit rejects is logged and left out.
pub fn window_attributes(config: &AppConfig, icon: Option<&RgbaImage>) -> WindowAttributes {
    let mut attrs = Window::default_attributes()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(false);

    if let Some(img) = icon {
        match Icon::from_rgba(img.as_raw().clone(), img.width(), img.height()) {
            Ok(icon) => attrs = attrs.with_window_icon(Some(icon)),
            Err(e) => log::warn!("window: ignoring icon: {e}"),
        }
    }
    attrs
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &AppConfig,
    icon: Option<&RgbaImage>,
) -> Result<Arc<Window>> {
    let window = event_loop
        .create_window(window_attributes(config, icon))
        .map_err(EngineError::CreateWindow)?;
    Ok(Arc::new(window))
}
