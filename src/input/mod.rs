use std::collections::HashSet;

use glam::IVec2;
pub use winit::keyboard::KeyCode;

/// Raw keyboard state for the current frame.
///
/// Two views are kept: single key presses, of which exactly one is handed to
/// the active scene per tick (menu navigation), and the set of keys held
/// down (continuous movement).
#[derive(Debug, Default)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    /// Presses received since the last tick, in arrival order.
    pressed: Vec<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down.  Auto-repeat presses of a held key are ignored.
    pub fn key_down(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.pressed.push(key);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    /// The key for this tick: the first press since the last call.  Any
    /// further presses from the same frame are discarded.
    pub fn take_key(&mut self) -> Option<KeyCode> {
        let key = self.pressed.first().copied();
        self.pressed.clear();
        key
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.keys_held.contains(&key) }

    /// Unit direction from the held arrow keys.  Opposite keys cancel.
    pub fn arrow_direction(&self) -> IVec2 {
        let mut dir = IVec2::ZERO;
        if self.is_key_held(KeyCode::ArrowUp) { dir.y -= 1; }
        if self.is_key_held(KeyCode::ArrowDown) { dir.y += 1; }
        if self.is_key_held(KeyCode::ArrowLeft) { dir.x -= 1; }
        if self.is_key_held(KeyCode::ArrowRight) { dir.x += 1; }
        dir
    }
}
