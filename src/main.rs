use glam::IVec2;
use image::{Rgba, RgbaImage};
use rand::Rng;

use blitkit::assets::ImageHandle;
use blitkit::canvas::Color;
use blitkit::engine::{App, Context};
use blitkit::entity::Entity;
use blitkit::error::Result;
use blitkit::geometry::Rect;
use blitkit::input::KeyCode;
use blitkit::menu::{Menu, MenuStyle, MenuView};
use blitkit::scene::{QUIT, Scene, SceneAction, SceneRef};
use blitkit::world::EntityId;

// ── Palette ─────────────────────────────────────────────────────────────────
const MENU_BG:        Color = Color::rgb(64, 0, 0);
const MENU_PANEL:     Color = Color::rgb(128, 0, 0);
const MENU_TEXT:      Color = Color::rgb(250, 40, 5);
const MENU_HIGHLIGHT: Color = Color::rgb(30, 10, 150);
const MENU_HIGHLIGHT_BG: Color = Color::rgb(160, 0, 0);
const STAGE_BG:       Color = Color::BLUE;
const BULLET:         Color = Color::YELLOW;
const DUMMY:          Color = Color::rgb(200, 120, 0);

const CAT: &str = "catsmirk.png";
const MAIN_MENU: &str = "menu_main";
const STEP: i32 = 10;

// ── Assets ──────────────────────────────────────────────────────────────────

/// Procedural stand-in used when the cat picture is missing from the assets.
fn draw_cat(size: u32) -> RgbaImage {
    let fur = Rgba([0xE8, 0x9A, 0x3C, 0xFF]);
    let dark = Rgba([0x20, 0x10, 0x08, 0xFF]);
    let mut img = RgbaImage::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let ear = y < size / 4 && (x < size / 4 || x >= size - size / 4);
            if y >= size / 4 || ear {
                img.put_pixel(x, y, fur);
            }
        }
    }
    // eyes
    for (ex, ey) in [(size / 3, size / 2), (size - size / 3 - 1, size / 2)] {
        img.put_pixel(ex, ey, dark);
    }
    img
}

fn cat_image(ctx: &mut Context) -> ImageHandle {
    match ctx.assets.load_image(CAT) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("demo: {e}; using a generated cat");
            ctx.assets.insert_image(CAT, draw_cat(32))
        }
    }
}

/// Start `name` as background music when that sound was loaded and is not
/// already the current track.
fn music(ctx: &mut Context, name: &str) -> Result<()> {
    let Ok(id) = ctx.audio.get_sound(&name.into()) else {
        return Ok(());
    };
    if ctx.audio.current_music() != Some(id) {
        ctx.play_music(id)?;
    }
    Ok(())
}

// ── Main menu look ──────────────────────────────────────────────────────────

struct RedMenu;

impl MenuStyle for RedMenu {
    fn ready(&mut self, ctx: &mut Context) -> Result<()> {
        ctx.world.clear();
        music(ctx, "menu")
    }

    fn render(&mut self, menu: &MenuView<'_>, ctx: &mut Context) {
        let h = ctx.screen_size().y;
        ctx.canvas.fill(MENU_BG);
        ctx.canvas.fill_rect(Rect::new(50, h - 120, 200, 70), MENU_PANEL);
        for (i, entry) in menu.entries.iter().enumerate() {
            let (color, background) = if i == menu.selected {
                (MENU_HIGHLIGHT, Some(MENU_HIGHLIGHT_BG))
            } else {
                (MENU_TEXT, None)
            };
            let pos = IVec2::new(70, 70 + 30 * i as i32);
            ctx.draw_text(&entry.label, pos, Some(color), background);
        }
    }
}

// ── Cat room: bouncing projectiles ──────────────────────────────────────────

struct Cats;

impl Scene for Cats {
    fn ready(&mut self, ctx: &mut Context) -> Result<()> {
        ctx.world.clear();
        let cat = cat_image(ctx);
        let screen = ctx.screen_size();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let x = rng.gen_range(100..(screen.x - 100).max(101));
            let y = rng.gen_range(100..(screen.y - 100).max(101));
            let builder = Entity::builder()
                .with_image(cat.clone())
                .at(x, y)
                .with_velocity(rng.gen_range(-10..=10), rng.gen_range(-10..=10))
                .bouncing();
            ctx.world.spawn(builder)?;
        }
        music(ctx, "cats")
    }

    fn update(&mut self, ctx: &mut Context, key: Option<KeyCode>) -> Result<SceneAction> {
        if key == Some(KeyCode::Escape) {
            return Ok(SceneAction::play(MAIN_MENU));
        }
        ctx.canvas.fill(MENU_BG);
        ctx.world.update_projectiles();
        ctx.world.blit_all(&mut ctx.canvas);
        Ok(SceneAction::None)
    }
}

// ── Stage: movement and shooting ────────────────────────────────────────────

#[derive(Default)]
struct Stage {
    player: Option<EntityId>,
    dummies: Vec<EntityId>,
}

impl Scene for Stage {
    fn ready(&mut self, ctx: &mut Context) -> Result<()> {
        ctx.world.clear();
        let cat = cat_image(ctx);
        let screen = ctx.screen_size();
        self.player = Some(ctx.world.spawn(Entity::builder().with_image(cat).at(screen.x / 2, screen.y / 3))?);

        self.dummies.clear();
        for i in 0..5 {
            let dummy = Entity::builder()
                .with_fill(DUMMY, 40, 40)
                .at(120 + i * 160, 60)
                .with_health(3);
            self.dummies.push(ctx.world.spawn(dummy)?);
        }
        music(ctx, "gong")
    }

    fn update(&mut self, ctx: &mut Context, key: Option<KeyCode>) -> Result<SceneAction> {
        if key == Some(KeyCode::Escape) {
            return Ok(SceneAction::play(MAIN_MENU));
        }
        let Some(player) = self.player else {
            return Ok(SceneAction::None);
        };
        ctx.canvas.fill(STAGE_BG);

        let dir = ctx.input.arrow_direction();
        ctx.world.move_entity(player, dir * STEP, false);
        ctx.world.restrict(player);

        if ctx.input.is_key_held(KeyCode::KeyZ) && ctx.tick() % 6 == 0 {
            ctx.world.prune(&mut self.dummies);
            let bullet = Entity::builder()
                .with_fill(BULLET, 6, 12)
                .with_velocity(0, -10)
                .with_targets(self.dummies.clone())
                .with_damage(1);
            ctx.world.fire(player, bullet)?;
        }

        for hit in ctx.world.update_projectiles() {
            if !ctx.world.is_alive(hit.target) {
                log::info!("demo: dummy {:?} destroyed", hit.target);
            }
        }
        ctx.world.blit_all(&mut ctx.canvas);
        let help_y = ctx.screen_size().y - 40;
        ctx.draw_text("ARROWS MOVE  Z FIRES  ESC MENU", IVec2::new(20, help_y), Some(Color::WHITE), None);
        Ok(SceneAction::None)
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

fn load_sounds(ctx: &mut Context) -> Vec<&'static str> {
    let sounds = [
        ("bonk.mp3", "bonk", Some(0.1)),
        ("gong.mp3", "gong", Some(0.8)),
        ("menu.mp3", "menu", None),
        ("cats.mp3", "cats", None),
    ];
    let mut loaded = Vec::new();
    for (file, name, volume) in sounds {
        match ctx.load_sound(file, Some(name), volume) {
            Ok(_) => loaded.push(name),
            Err(e) => log::warn!("demo: {e}"),
        }
    }
    loaded
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = App::builder()
        .with_title("Das Cash Money Adventure")
        .build()?;

    let ctx = app.context_mut();
    if ctx.assets.image_path(CAT).is_file() {
        ctx.config.logo = Some(CAT.into());
    }
    let loaded = load_sounds(ctx);

    let targets: Vec<Option<SceneRef>> = vec![
        Some("stage1".into()),
        None,
        None,
        Some("cats".into()),
        Some(QUIT.into()),
    ];
    let mut menu = Menu::new(vec!["New Game", "Options", "Music Room", "Cat Room", "Quit"], targets)?
        .with_style(RedMenu);
    if loaded.contains(&"bonk") {
        menu = menu.with_change_sound("bonk");
    }
    if loaded.contains(&"gong") {
        menu = menu.with_select_sound("gong");
    }

    app.register_scene(MAIN_MENU, menu)?;
    app.register_scene("cats", Cats)?;
    app.register_scene("stage1", Stage::default())?;
    app.set_first_scene(MAIN_MENU);
    app.run()
}
