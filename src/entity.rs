//! Screen-space entities: sprites, obstacles, projectiles and bullets.
//!
//! An [`Entity`] owns the shared data (position, size, visual payload) and a
//! [`Role`] that carries the optional motion and combat components.  Behaviour
//! is picked by matching on the role rather than on a type hierarchy.

use glam::IVec2;

use crate::assets::ImageHandle;
use crate::canvas::Color;
use crate::error::ConfigError;
use crate::geometry::{Rect, clamp_to_range};
use crate::world::EntityId;

/// How far past a screen edge a non-bouncing projectile may travel before it
/// is considered gone.
pub const DESPAWN_MARGIN: i32 = 5;

/// Half-width of the square a bullet searches for targets in.
pub const HIT_RADIUS: i32 = 5;

// ── Components ──────────────────────────────────────────────────────────────

/// What gets drawn for an entity.
#[derive(Clone, Debug)]
pub enum Visual {
    Image(ImageHandle),
    Fill { color: Color, size: IVec2 },
}

impl Visual {
    pub fn size(&self) -> IVec2 {
        match self {
            Visual::Image(img) => IVec2::new(img.width() as i32, img.height() as i32),
            Visual::Fill { size, .. } => *size,
        }
    }
}

/// Linear motion, advanced once per [`Entity::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Motion {
    pub velocity: IVec2,
    /// Velocity at spawn time, kept so the projectile can be reset.
    pub initial_velocity: IVec2,
    /// Bounce off screen edges instead of leaving the screen.
    pub bounce: bool,
}

impl Motion {
    pub fn new(velocity: IVec2, bounce: bool) -> Self {
        Self { velocity, initial_velocity: velocity, bounce }
    }

    pub fn reset(&mut self) {
        self.velocity = self.initial_velocity;
    }
}

/// Remaining number of hits a bullet may land.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitBudget {
    Unlimited,
    Remaining(u32),
}

impl HitBudget {
    /// Consume one hit.  Returns `true` once the budget is exhausted.
    pub fn spend(&mut self) -> bool {
        match self {
            HitBudget::Unlimited => false,
            HitBudget::Remaining(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, HitBudget::Remaining(0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combat {
    /// Entity that fired the bullet; never hit by it.
    pub shooter: EntityId,
    /// When set, only these entities can be hit.
    pub targets: Option<Vec<EntityId>>,
    pub hits: HitBudget,
    pub damage: Option<i32>,
}

impl Combat {
    pub fn can_hit(&self, candidate: EntityId) -> bool {
        candidate != self.shooter
            && self.targets.as_ref().is_none_or(|t| t.contains(&candidate))
    }
}

/// Capability of receiving damage from a bullet.
pub trait Damageable {
    fn take_damage(&mut self, amount: i32);
    fn is_depleted(&self) -> bool;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).min(self.max);
    }

    fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Sprite,
    /// Static blocker consulted when team members move.
    Obstacle,
    Projectile(Motion),
    Bullet(Motion, Combat),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Sprite,
    Obstacle,
    Projectile,
    Bullet,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The entity has no motion component.
    Static,
    Moved,
    /// Left the screen by more than [`DESPAWN_MARGIN`]; the owner should drop it.
    OutOfBounds,
}

// ── Entity ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Entity {
    pub pos: IVec2,
    size: IVec2,
    /// Largest position that keeps the entity fully on screen.
    max: IVec2,
    visual: Visual,
    role: Role,
    health: Option<Health>,
    alive: bool,
}

impl Entity {
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    pub fn visual(&self) -> &Visual { &self.visual }
    pub fn role(&self) -> &Role { &self.role }
    pub fn size(&self) -> IVec2 { self.size }
    pub fn width(&self) -> i32 { self.size.x }
    pub fn height(&self) -> i32 { self.size.y }
    pub fn right(&self) -> i32 { self.pos.x.saturating_add(self.size.x) }
    pub fn bottom(&self) -> i32 { self.pos.y.saturating_add(self.size.y) }
    pub fn max_x(&self) -> i32 { self.max.x }
    pub fn max_y(&self) -> i32 { self.max.y }
    pub fn rect(&self) -> Rect { Rect::from_pos_size(self.pos, self.size) }
    pub fn center(&self) -> IVec2 { self.pos + self.size / 2 }
    pub fn is_alive(&self) -> bool { self.alive }

    /// Mark the entity dead; its owner removes it at the next compaction.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn kind(&self) -> EntityKind {
        match self.role {
            Role::Sprite => EntityKind::Sprite,
            Role::Obstacle => EntityKind::Obstacle,
            Role::Projectile(_) => EntityKind::Projectile,
            Role::Bullet(..) => EntityKind::Bullet,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self.role, Role::Obstacle)
    }

    pub fn motion(&self) -> Option<&Motion> {
        match &self.role {
            Role::Projectile(m) | Role::Bullet(m, _) => Some(m),
            _ => None,
        }
    }

    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        match &mut self.role {
            Role::Projectile(m) | Role::Bullet(m, _) => Some(m),
            _ => None,
        }
    }

    pub fn combat(&self) -> Option<&Combat> {
        match &self.role {
            Role::Bullet(_, c) => Some(c),
            _ => None,
        }
    }

    pub fn combat_mut(&mut self) -> Option<&mut Combat> {
        match &mut self.role {
            Role::Bullet(_, c) => Some(c),
            _ => None,
        }
    }

    pub fn health(&self) -> Option<&Health> {
        self.health.as_ref()
    }

    pub fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        self.health.as_mut().map(|h| h as &mut dyn Damageable)
    }

    /// Clamp the position so the whole entity is on screen.
    pub fn restrict(&mut self) {
        self.pos.x = clamp_to_range(self.pos.x, self.max.x);
        self.pos.y = clamp_to_range(self.pos.y, self.max.y);
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.pos.x > self.max.x + DESPAWN_MARGIN
            || self.pos.x < -self.size.x - DESPAWN_MARGIN
            || self.pos.y > self.max.y + DESPAWN_MARGIN
            || self.pos.y < -self.size.y - DESPAWN_MARGIN
    }

    /// Advance by one velocity step.
    ///
    /// Bouncing entities are clamped back on screen and their velocity sign is
    /// forced to point away from whichever edge they sit on.
    pub fn step(&mut self) -> StepOutcome {
        let Some(motion) = self.motion().cloned() else {
            return StepOutcome::Static;
        };
        self.pos = self.pos.saturating_add(motion.velocity);

        if !motion.bounce {
            return if self.is_out_of_bounds() {
                StepOutcome::OutOfBounds
            } else {
                StepOutcome::Moved
            };
        }

        self.restrict();
        let (pos, max) = (self.pos, self.max);
        let Some(m) = self.motion_mut() else {
            return StepOutcome::Moved;
        };
        if pos.x == 0 {
            m.velocity.x = m.velocity.x.abs();
        } else if pos.x == max.x {
            m.velocity.x = -m.velocity.x.abs();
        }
        if pos.y == 0 {
            m.velocity.y = m.velocity.y.abs();
        } else if pos.y == max.y {
            m.velocity.y = -m.velocity.y.abs();
        }
        StepOutcome::Moved
    }
}

// ── EntityBuilder ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct EntityBuilder {
    image: Option<ImageHandle>,
    fill: Option<(Color, IVec2)>,
    pos: IVec2,
    velocity: Option<IVec2>,
    bounce: bool,
    obstacle: bool,
    shooter: Option<EntityId>,
    targets: Option<Vec<EntityId>>,
    hits: HitBudget,
    damage: Option<i32>,
    health: Option<i32>,
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self {
            image: None,
            fill: None,
            pos: IVec2::new(1, 1),
            velocity: None,
            bounce: false,
            obstacle: false,
            shooter: None,
            targets: None,
            hits: HitBudget::Remaining(1),
            damage: None,
            health: None,
        }
    }
}

impl EntityBuilder {
    pub fn with_image(mut self, image: ImageHandle) -> Self { self.image = Some(image); self }
    pub fn with_fill(mut self, color: Color, width: i32, height: i32) -> Self {
        self.fill = Some((color, IVec2::new(width, height))); self
    }
    pub fn at(mut self, x: i32, y: i32) -> Self { self.pos = IVec2::new(x, y); self }
    pub fn with_velocity(mut self, vx: i32, vy: i32) -> Self { self.velocity = Some(IVec2::new(vx, vy)); self }
    pub fn bouncing(mut self) -> Self { self.bounce = true; self }
    pub fn obstacle(mut self) -> Self { self.obstacle = true; self }

    /// Turn the entity into a bullet fired by `shooter`.
    pub fn bullet(mut self, shooter: EntityId) -> Self { self.shooter = Some(shooter); self }
    pub fn with_targets(mut self, targets: Vec<EntityId>) -> Self { self.targets = Some(targets); self }
    pub fn with_hits(mut self, hits: HitBudget) -> Self { self.hits = hits; self }
    pub fn with_damage(mut self, damage: i32) -> Self { self.damage = Some(damage); self }
    pub fn with_health(mut self, hp: i32) -> Self { self.health = Some(hp); self }

    pub(crate) fn set_pos(&mut self, pos: IVec2) { self.pos = pos; }

    pub(crate) fn set_shooter(&mut self, shooter: EntityId) { self.shooter = Some(shooter); }

    /// Size the builder will produce, if a visual has been set.
    pub fn size(&self) -> Option<IVec2> {
        match (&self.image, &self.fill) {
            (Some(img), _) => Some(IVec2::new(img.width() as i32, img.height() as i32)),
            (None, Some((_, size))) => Some(*size),
            (None, None) => None,
        }
    }

    /// Finish the entity for a screen of `screen` pixels.  An image takes
    /// precedence over a fill; having neither is an error.
    pub fn build(self, screen: IVec2) -> Result<Entity, ConfigError> {
        let visual = match (self.image, self.fill) {
            (Some(img), _) => Visual::Image(img),
            (None, Some((color, size))) => Visual::Fill { color, size },
            (None, None) => return Err(ConfigError::MissingVisual),
        };
        let size = visual.size();
        let motion = || Motion::new(self.velocity.unwrap_or(IVec2::ZERO), self.bounce);
        let role = match self.shooter {
            Some(shooter) => Role::Bullet(
                motion(),
                Combat { shooter, targets: self.targets.clone(), hits: self.hits, damage: self.damage },
            ),
            None if self.velocity.is_some() => Role::Projectile(motion()),
            None if self.obstacle => Role::Obstacle,
            None => Role::Sprite,
        };
        Ok(Entity {
            pos: self.pos,
            size,
            max: screen - size,
            visual,
            role,
            health: self.health.map(Health::new),
            alive: true,
        })
    }
}
