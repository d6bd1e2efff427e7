use blitkit::canvas::Color;
use blitkit::text::*;
use image::{Rgba, RgbaImage};
use std::sync::Arc;

#[test]
fn test_builtin_measure() {
    let font = Font::builtin();
    assert_eq!(font.line_height(), 24);
    assert_eq!(font.measure("AB"), (36, 24));
    assert_eq!(font.measure("ab"), font.measure("AB"));
    // characters without a glyph take no space
    assert_eq!(font.measure("A~"), (18, 24));
}

#[test]
fn test_with_size_rounds_to_whole_scale() {
    let font = Font::builtin().with_size(17);
    assert_eq!(font.line_height(), 16);
    let tiny = Font::builtin().with_size(1);
    assert_eq!(tiny.line_height(), 8);
}

#[test]
fn test_render_uses_colour_and_background() {
    let font = Font::builtin().with_size(8);
    let img = font.render("I", Color::RED, Some(Color::BLACK));
    assert_eq!(img.dimensions(), (6, 8));
    assert!(img.pixels().any(|p| *p == Color::RED.to_rgba()));
    assert!(img.pixels().any(|p| *p == Color::BLACK.to_rgba()));
    assert!(img.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn test_atlas_json_font() {
    let mut atlas = RgbaImage::new(4, 2);
    atlas.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
    let json = r#"{ "x": { "x": 0, "y": 0, "w": 2, "h": 2 }, "yy": { "x": 2, "y": 0, "w": 2, "h": 2 } }"#;
    let font = Font::from_atlas_json(atlas, json).unwrap();
    assert_eq!(font.glyph_count(), 1);
    assert_eq!(font.measure("xx"), (4, 2));
    assert!(Font::from_atlas_json(RgbaImage::new(1, 1), "[").is_err());
}

#[test]
fn test_cache_reuses_bitmaps() {
    let font = Font::builtin();
    let mut cache = TextCache::new();
    let a = cache.text(&font, "SCORE", None, None);
    let b = cache.text(&font, "SCORE", None, None);
    assert!(Arc::ptr_eq(&a, &b));

    cache.text(&font, "SCORE", None, Some(Color::BLACK));
    cache.text(&font, "SCORE", Some(DEFAULT_TEXT_COLOR), None);
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
}
