use glam::IVec2;

use crate::canvas::Canvas;
use crate::entity::{Entity, EntityBuilder, HIT_RADIUS, StepOutcome};
use crate::error::{EngineError, Result};
use crate::geometry::{Rect, within_box};
use crate::team::{Team, TeamId};

// ---------------------------------------------------------------------------
// EntityId: generational index
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// Hit: one bullet/target contact reported by `check_bullet`
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    pub bullet: EntityId,
    pub target: EntityId,
    /// True when the target could take damage and the bullet carried some.
    pub damaged: bool,
}

struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

// ---------------------------------------------------------------------------
// World: entity arena, render order and teams
// ---------------------------------------------------------------------------

/// Owns every entity of an app.  The insertion order of live entities is the
/// render order.  Entities are killed in place and only leave the arena on
/// [`World::compact`], so ids stay valid for the rest of the tick.
pub struct World {
    screen: IVec2,
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<EntityId>,
    teams: Vec<Team>,
    enabled_teams: Vec<TeamId>,
}

impl World {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen: IVec2::new(screen_width as i32, screen_height as i32),
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            teams: Vec::new(),
            enabled_teams: Vec::new(),
        }
    }

    pub fn screen(&self) -> IVec2 {
        self.screen
    }

    // -- spawn / kill / compact ---------------------------------------------

    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<EntityId> {
        let entity = builder.build(self.screen)?;
        Ok(self.insert(entity))
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            EntityId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, entity: Some(entity) });
            EntityId { index, generation: 0 }
        };
        self.order.push(id);
        id
    }

    /// Mark an entity dead.  Returns false when it was already dead or gone.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(e) if e.is_alive() => {
                e.kill();
                true
            }
            _ => false,
        }
    }

    /// Drop every dead entity from the arena, the render order and all teams.
    /// Returns the number of entities removed.
    pub fn compact(&mut self) -> usize {
        let mut removed = Vec::new();
        for id in &self.order {
            let slot = &mut self.slots[id.index as usize];
            let dead = slot.entity.as_ref().is_some_and(|e| !e.is_alive());
            if dead && slot.generation == id.generation {
                slot.entity = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                removed.push(*id);
            }
        }
        if removed.is_empty() {
            return 0;
        }
        self.order.retain(|id| !removed.contains(id));
        for team in &mut self.teams {
            team.members.retain(|m| !removed.contains(m));
        }
        log::trace!("world: compacted {} dead entities", removed.len());
        removed.len()
    }

    /// Remove every entity and team.  Entity ids handed out before no longer
    /// resolve.
    pub fn clear(&mut self) -> usize {
        for id in self.order.clone() {
            self.kill(id);
        }
        self.teams.clear();
        self.enabled_teams.clear();
        self.compact()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| e.is_alive())
    }

    /// Present entities in render order, dead-but-not-compacted ones included.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in render order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|e| (*id, e)))
            .filter(|(_, e)| e.is_alive())
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove ids of dead or removed entities from a caller-owned list.
    pub fn prune(&self, ids: &mut Vec<EntityId>) {
        ids.retain(|id| self.is_alive(*id));
    }

    // -- movement -----------------------------------------------------------

    pub fn restrict(&mut self, id: EntityId) {
        if let Some(e) = self.get_mut(id) {
            e.restrict();
        }
    }

    /// Move by `delta`.  With `check_collision` the move is rejected as a
    /// whole when the destination overlaps an obstacle sharing an enabled
    /// team with the entity.  Returns whether the move was applied.
    pub fn move_entity(&mut self, id: EntityId, delta: IVec2, check_collision: bool) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        let candidate = entity.rect().translated(delta);
        if check_collision && self.is_blocked(id, &candidate) {
            return false;
        }
        if let Some(entity) = self.get_mut(id) {
            entity.pos = entity.pos.saturating_add(delta);
        }
        true
    }

    /// True when `candidate` overlaps any live obstacle on a team `mover` is in.
    pub fn is_blocked(&self, mover: EntityId, candidate: &Rect) -> bool {
        self.teams_of(mover)
            .flat_map(|team| team.members.iter())
            .filter(|m| **m != mover)
            .filter_map(|m| self.get(*m))
            .filter(|e| e.is_alive() && e.is_obstacle())
            .any(|obstacle| candidate.overlaps(&obstacle.rect()))
    }

    /// Advance one entity; non-bouncing projectiles past the despawn margin
    /// are killed.
    pub fn step(&mut self, id: EntityId) -> StepOutcome {
        let Some(entity) = self.get_mut(id) else {
            return StepOutcome::Static;
        };
        let outcome = entity.step();
        if outcome == StepOutcome::OutOfBounds {
            entity.kill();
        }
        outcome
    }

    /// Step every live moving entity, then let every live bullet look for
    /// targets.  Returns all hits landed this pass.
    pub fn update_projectiles(&mut self) -> Vec<Hit> {
        let movers: Vec<EntityId> = self
            .iter()
            .filter(|(_, e)| e.motion().is_some())
            .map(|(id, _)| id)
            .collect();
        for id in &movers {
            self.step(*id);
        }
        let mut hits = Vec::new();
        for id in movers {
            hits.extend(self.check_bullet(id));
        }
        hits
    }

    // -- bullets ------------------------------------------------------------

    /// Scan live entities near the bullet and damage the ones it may hit.
    ///
    /// A candidate is hit when its position lies strictly within
    /// [`HIT_RADIUS`] of the bullet on both axes, it passes the target
    /// allowlist, and it is neither the shooter nor the bullet.  Each hit
    /// spends one unit of the budget; an exhausted bullet is killed.
    pub fn check_bullet(&mut self, bullet: EntityId) -> Vec<Hit> {
        let Some(b) = self.get(bullet).filter(|e| e.is_alive()) else {
            return Vec::new();
        };
        let Some(combat) = b.combat() else {
            return Vec::new();
        };
        let origin = b.pos;
        let damage = combat.damage;
        let mut budget = combat.hits;
        let candidates: Vec<EntityId> = self
            .iter()
            .filter(|(id, e)| {
                *id != bullet && combat.can_hit(*id) && within_box(origin, e.pos, HIT_RADIUS)
            })
            .map(|(id, _)| id)
            .collect();

        let mut hits = Vec::new();
        for target in candidates {
            if budget.is_exhausted() {
                break;
            }
            let damaged = self.apply_damage(target, damage);
            hits.push(Hit { bullet, target, damaged });
            budget.spend();
        }

        if let Some(b) = self.get_mut(bullet) {
            if let Some(c) = b.combat_mut() {
                c.hits = budget;
            }
            if budget.is_exhausted() {
                b.kill();
            }
        }
        hits
    }

    fn apply_damage(&mut self, target: EntityId, damage: Option<i32>) -> bool {
        let (Some(amount), Some(entity)) = (damage, self.get_mut(target)) else {
            return false;
        };
        let depleted = match entity.damageable_mut() {
            Some(d) => {
                d.take_damage(amount);
                d.is_depleted()
            }
            None => return false,
        };
        if depleted {
            entity.kill();
        }
        true
    }

    /// Spawn a bullet centred on `shooter`, recording it as the shooter.
    pub fn fire(&mut self, shooter: EntityId, mut bullet: EntityBuilder) -> Result<EntityId> {
        let origin = self
            .get(shooter)
            .filter(|e| e.is_alive())
            .map(|e| e.center())
            .ok_or(EngineError::EntityNotFound(shooter))?;
        let half = bullet.size().unwrap_or(IVec2::ZERO) / 2;
        bullet.set_pos(origin - half);
        bullet.set_shooter(shooter);
        self.spawn(bullet)
    }

    // -- teams --------------------------------------------------------------

    /// Store a team and enable it.
    pub fn add_team(&mut self, team: Team) -> TeamId {
        let id = TeamId(self.teams.len() as u32);
        self.teams.push(team);
        self.enable_team(id);
        id
    }

    pub fn create_team(&mut self, name: &str, members: Vec<EntityId>) -> TeamId {
        self.add_team(Team::new(name, members))
    }

    /// Enable a team for collision checks.  Enabling twice is a no-op.
    pub fn enable_team(&mut self, id: TeamId) {
        if (id.0 as usize) < self.teams.len() && !self.enabled_teams.contains(&id) {
            self.enabled_teams.push(id);
        }
    }

    pub fn disable_team(&mut self, id: TeamId) {
        self.enabled_teams.retain(|t| *t != id);
    }

    pub fn is_team_enabled(&self, id: TeamId) -> bool {
        self.enabled_teams.contains(&id)
    }

    pub fn enabled_team_count(&self) -> usize {
        self.enabled_teams.len()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id.0 as usize)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.get_mut(id.0 as usize)
    }

    /// Enabled teams that list `entity` as a member.
    pub fn teams_of(&self, entity: EntityId) -> impl Iterator<Item = &Team> + '_ {
        self.enabled_teams
            .iter()
            .filter_map(|id| self.teams.get(id.0 as usize))
            .filter(move |team| team.contains(entity))
    }

    // -- drawing ------------------------------------------------------------

    /// Draw every live entity in render order.
    pub fn blit_all(&self, canvas: &mut Canvas) {
        for (_, entity) in self.iter() {
            canvas.draw_entity(entity);
        }
    }

    /// Draw only the listed entities, skipping dead ones.
    pub fn blit_list(&self, ids: &[EntityId], canvas: &mut Canvas) {
        for entity in ids.iter().filter_map(|id| self.get(*id)).filter(|e| e.is_alive()) {
            canvas.draw_entity(entity);
        }
    }
}
