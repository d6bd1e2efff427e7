use crate::world::EntityId;

/// Handle to a team stored in a [`World`](crate::world::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TeamId(pub(crate) u32);

/// Named group of entities.  Moving members of an enabled team are blocked
/// by the team's obstacle members.
#[derive(Clone, Debug)]
pub struct Team {
    pub name: String,
    /// Membership order is kept; duplicates are allowed.
    pub members: Vec<EntityId>,
}

impl Team {
    pub fn new(name: &str, members: Vec<EntityId>) -> Self {
        Self { name: name.to_string(), members }
    }

    pub fn add_member(&mut self, entity: EntityId) {
        self.members.push(entity);
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.members.contains(&entity)
    }
}
