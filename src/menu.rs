use glam::IVec2;

use crate::audio::SoundRef;
use crate::canvas::Color;
use crate::engine::Context;
use crate::error::{ConfigError, Result};
use crate::input::KeyCode;
use crate::scene::{Scene, SceneAction, SceneRef};

/// Background of the default menu look.
pub const MENU_BACKGROUND: Color = Color::rgb(250, 250, 250);
/// Label colour of the highlighted entry.
pub const MENU_SELECTED: Color = Color::GREEN;
pub const MENU_LABEL: Color = Color::BLACK;
/// Top-left corner of the first label.
pub const MENU_ORIGIN: IVec2 = IVec2::new(20, 20);

// ── Keys / sounds / policy ────────────────────────────────────────────────────

/// Key bindings of a menu.  Each action accepts any key in its set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuKeys {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub select: Vec<KeyCode>,
    /// Only honoured when the menu has a parent scene.
    pub exit: Vec<KeyCode>,
}

impl Default for MenuKeys {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::ArrowDown],
            backward: vec![KeyCode::ArrowUp],
            select: vec![KeyCode::Enter],
            exit: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuSounds {
    /// Played when the selection moves either way.
    pub change: Option<SoundRef>,
    pub select: Option<SoundRef>,
    pub exit: Option<SoundRef>,
}

/// What happens to the highlighted entry when the menu is entered again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Back to the first entry on every activation and after leaving.
    #[default]
    ResetOnEnter,
    /// Keep the last highlighted entry.
    Preserve,
}

// ── Rendering hook ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    /// `None` makes the entry inert on select.
    pub target: Option<SceneRef>,
}

/// Read-only snapshot of a menu handed to its [`MenuStyle`].
#[derive(Copy, Clone, Debug)]
pub struct MenuView<'a> {
    pub entries: &'a [MenuEntry],
    pub selected: usize,
}

/// Custom look and entry behaviour for a [`Menu`].  Navigation and
/// transitions stay with the menu; a style only sees the result.
pub trait MenuStyle {
    /// Extra work when the menu is activated.  Runs after the selection reset.
    fn ready(&mut self, _ctx: &mut Context) -> Result<()> { Ok(()) }
    /// Draw the menu.  Called once per tick after key handling.
    fn render(&mut self, menu: &MenuView<'_>, ctx: &mut Context);
}

/// Light background with labels stacked from the top-left corner, the
/// selected one in green.
#[derive(Debug, Default)]
pub struct DefaultMenuStyle;

impl MenuStyle for DefaultMenuStyle {
    fn render(&mut self, menu: &MenuView<'_>, ctx: &mut Context) {
        ctx.canvas.fill(MENU_BACKGROUND);
        let step = ctx.font.line_height() as i32 + 8;
        for (i, entry) in menu.entries.iter().enumerate() {
            let color = if i == menu.selected { MENU_SELECTED } else { MENU_LABEL };
            let pos = MENU_ORIGIN + IVec2::new(0, step * i as i32);
            ctx.draw_text(&entry.label, pos, Some(color), None);
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

/// A scene showing a vertical list of labels; the keyboard moves the
/// highlight (wrapping at both ends) and selecting an entry switches to its
/// target scene.
pub struct Menu {
    entries: Vec<MenuEntry>,
    selected: usize,
    keys: MenuKeys,
    sounds: MenuSounds,
    parent: Option<SceneRef>,
    policy: SelectionPolicy,
    style: Box<dyn MenuStyle>,
}

impl Menu {
    /// Pair `names[i]` with `targets[i]`.  Both lists must be non-empty and
    /// of equal length.
    pub fn new<S: Into<String>>(
        names: Vec<S>,
        targets: Vec<Option<SceneRef>>,
    ) -> std::result::Result<Self, ConfigError> {
        if names.len() != targets.len() {
            return Err(ConfigError::MenuLengthMismatch { names: names.len(), targets: targets.len() });
        }
        if names.is_empty() {
            return Err(ConfigError::EmptyMenu);
        }
        let entries = names
            .into_iter()
            .zip(targets)
            .map(|(label, target)| MenuEntry { label: label.into(), target })
            .collect();
        Ok(Self {
            entries,
            selected: 0,
            keys: MenuKeys::default(),
            sounds: MenuSounds::default(),
            parent: None,
            policy: SelectionPolicy::default(),
            style: Box::new(DefaultMenuStyle),
        })
    }

    pub fn with_keys(mut self, keys: MenuKeys) -> Self { self.keys = keys; self }
    pub fn with_sounds(mut self, sounds: MenuSounds) -> Self { self.sounds = sounds; self }
    pub fn with_change_sound(mut self, sound: impl Into<SoundRef>) -> Self { self.sounds.change = Some(sound.into()); self }
    pub fn with_select_sound(mut self, sound: impl Into<SoundRef>) -> Self { self.sounds.select = Some(sound.into()); self }
    pub fn with_exit_sound(mut self, sound: impl Into<SoundRef>) -> Self { self.sounds.exit = Some(sound.into()); self }
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self { self.policy = policy; self }
    pub fn with_style(mut self, style: impl MenuStyle + 'static) -> Self { self.style = Box::new(style); self }

    /// Scene to return to on an exit key.  Exit keys default to Escape once
    /// a parent is set, unless exit keys were configured explicitly.
    pub fn with_parent(mut self, parent: impl Into<SceneRef>) -> Self {
        self.parent = Some(parent.into());
        if self.keys.exit.is_empty() {
            self.keys.exit.push(KeyCode::Escape);
        }
        self
    }

    pub fn selected(&self) -> usize { self.selected }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn entries(&self) -> &[MenuEntry] { &self.entries }
    pub fn keys(&self) -> &MenuKeys { &self.keys }
    pub fn policy(&self) -> SelectionPolicy { self.policy }

    /// Resolve `target` first so a bad entry leaves the selection alone.
    fn leave(&self, ctx: &Context, target: &SceneRef, next: &mut isize) -> Result<SceneAction> {
        let id = ctx.get_scene(target)?;
        if self.policy == SelectionPolicy::ResetOnEnter {
            *next = 0;
        }
        Ok(SceneAction::play(id))
    }
}

fn play_opt(ctx: &mut Context, sound: &Option<SoundRef>) -> Result<()> {
    match sound {
        Some(s) => ctx.audio.play(s),
        None => Ok(()),
    }
}

impl Scene for Menu {
    fn ready(&mut self, ctx: &mut Context) -> Result<()> {
        if self.policy == SelectionPolicy::ResetOnEnter {
            self.selected = 0;
        }
        self.style.ready(ctx)
    }

    fn update(&mut self, ctx: &mut Context, key: Option<KeyCode>) -> Result<SceneAction> {
        let mut next = self.selected as isize;
        let mut action = SceneAction::None;

        if let Some(key) = key {
            if self.keys.forward.contains(&key) {
                play_opt(ctx, &self.sounds.change)?;
                next += 1;
            } else if self.keys.backward.contains(&key) {
                play_opt(ctx, &self.sounds.change)?;
                next -= 1;
            } else if self.keys.select.contains(&key) {
                play_opt(ctx, &self.sounds.select)?;
                if let Some(target) = &self.entries[self.selected].target {
                    action = self.leave(ctx, target, &mut next)?;
                }
            } else if self.keys.exit.contains(&key) {
                if let Some(parent) = &self.parent {
                    play_opt(ctx, &self.sounds.exit)?;
                    action = self.leave(ctx, parent, &mut next)?;
                }
            }
        }

        self.selected = next.rem_euclid(self.entries.len() as isize) as usize;

        let view = MenuView { entries: &self.entries, selected: self.selected };
        self.style.render(&view, ctx);
        Ok(action)
    }
}
