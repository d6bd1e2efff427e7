//! # Obstacles Example
//!
//! A player square walks around with the arrow keys; red obstacles on the
//! same team block it.  Hold Shift to walk through them.

use rand::Rng;

use blitkit::canvas::Color;
use blitkit::engine::{App, Context};
use blitkit::entity::Entity;
use blitkit::error::Result;
use blitkit::input::KeyCode;
use blitkit::scene::{Scene, SceneAction};
use blitkit::world::EntityId;

const OBSTACLE_COUNT: usize = 5;
const BACKGROUND: Color = Color::BLUE;
const OBSTACLE: Color = Color::RED;
const PLAYER: Color = Color::rgb(240, 240, 240);
const STEP: i32 = 10;

#[derive(Default)]
struct Start {
    player: Option<EntityId>,
}

impl Scene for Start {
    fn ready(&mut self, ctx: &mut Context) -> Result<()> {
        ctx.world.clear();
        let screen = ctx.screen_size();
        let player = ctx
            .world
            .spawn(Entity::builder().with_fill(PLAYER, 32, 32).at(screen.x / 2, screen.y / 3))?;
        self.player = Some(player);

        let team = ctx.world.create_team("collision", vec![player]);
        let mut rng = rand::thread_rng();
        for _ in 0..OBSTACLE_COUNT {
            let w = rng.gen_range(screen.x / 30..=screen.x / 3);
            let h = rng.gen_range((screen.y / 100).max(1)..=screen.y / 10);
            let x = rng.gen_range(1..(screen.x - w - 1).max(2));
            let y = rng.gen_range(1..(screen.y - h - 1).max(2));
            let obstacle = ctx
                .world
                .spawn(Entity::builder().with_fill(OBSTACLE, w, h).at(x, y).obstacle())?;
            if let Some(t) = ctx.world.team_mut(team) {
                t.add_member(obstacle);
            }
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context, key: Option<KeyCode>) -> Result<SceneAction> {
        if key == Some(KeyCode::Escape) {
            return Ok(SceneAction::quit());
        }
        let Some(player) = self.player else {
            return Ok(SceneAction::None);
        };
        ctx.canvas.fill(BACKGROUND);

        let ghost = ctx.input.is_key_held(KeyCode::ShiftLeft) || ctx.input.is_key_held(KeyCode::ShiftRight);
        let dir = ctx.input.arrow_direction();
        ctx.world.move_entity(player, dir * STEP, !ghost);
        ctx.world.restrict(player);

        ctx.world.blit_all(&mut ctx.canvas);
        Ok(SceneAction::None)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = App::builder().with_title("obstacle test").with_audio(false).build()?;
    app.register_scene("test", Start::default())?;
    app.set_first_scene("test");
    app.run()
}
