use std::path::Path;

use kira::{
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
    Volume,
};

use crate::error::{EngineError, Result};
use crate::registry::{Handle, Ref, Registry, ResolveError};

/// Handle to a sound in an [`AudioContext`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoundId(usize);

impl Handle for SoundId {
    const KIND: &'static str = "sound";
    fn from_index(index: usize) -> Self { SoundId(index) }
    fn index(self) -> usize { self.0 }
}

/// A sound given by registry name or by handle.
pub type SoundRef = Ref<SoundId>;

impl From<SoundId> for SoundRef {
    fn from(id: SoundId) -> Self {
        Ref::Handle(id)
    }
}

/// Decoded sound plus the volume it was registered with.
pub struct Sound {
    data: StaticSoundData,
    volume: f32,
}

impl Sound {
    pub fn new(data: StaticSoundData, volume: f32) -> Self {
        Self { data, volume }
    }

    pub fn volume(&self) -> f32 { self.volume }

    fn settings(&self) -> StaticSoundSettings {
        let mut settings = StaticSoundSettings::new();
        settings.volume = Volume::Amplitude(self.volume.clamp(0.0, 2.0) as f64).into();
        settings
    }
}

pub struct AudioContext {
    /// `None` when audio is disabled or no device is available (headless / CI).
    manager: Option<AudioManager>,
    sounds: Registry<SoundId, Sound>,
    /// Track most recently started with [`AudioContext::play_music`], kept
    /// even when no device is open.
    current_music: Option<SoundId>,
    music_handle: Option<StaticSoundHandle>,
}

impl AudioContext {
    /// Open the default audio device when `enabled`.  A device that fails to
    /// open is logged and audio is disabled; sounds still register and
    /// resolve normally.
    pub fn new(enabled: bool) -> Self {
        let manager = if enabled {
            match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
                Ok(m) => Some(m),
                Err(e) => {
                    log::warn!("audio: failed to initialize audio manager: {e}. Audio disabled.");
                    None
                }
            }
        } else {
            None
        };
        Self { manager, sounds: Registry::new(), current_music: None, music_handle: None }
    }

    /// Returns true if audio hardware is available.
    pub fn is_available(&self) -> bool { self.manager.is_some() }

    /// Decode a sound file (OGG, WAV, MP3) and register it.  With a `name`
    /// the sound can later be referred to by that name; a previous sound of
    /// the same name is shadowed.  `volume` defaults to 1.0.
    pub fn load_sound<P: AsRef<Path>>(
        &mut self,
        path: P,
        name: Option<&str>,
        volume: Option<f32>,
    ) -> Result<SoundId> {
        let path = path.as_ref();
        let data = StaticSoundData::from_file(path).map_err(|e| EngineError::Sound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::debug!("audio: loaded '{}' as {:?}", path.display(), name);
        Ok(self.insert(name, Sound::new(data, volume.unwrap_or(1.0))))
    }

    pub fn insert(&mut self, name: Option<&str>, sound: Sound) -> SoundId {
        match name {
            Some(name) => self.sounds.insert(name, sound),
            None => self.sounds.push(sound),
        }
    }

    /// Resolve a name or handle to a sound registered here.
    pub fn get_sound(&self, sound: &SoundRef) -> Result<SoundId> {
        self.sounds.resolve(sound).map_err(|e| match e {
            ResolveError::UnknownName(name) => EngineError::SoundNotFound(name),
            ResolveError::ForeignHandle(index) => EngineError::InvalidHandle { kind: SoundId::KIND, index },
        })
    }

    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Play a sound once.
    pub fn play(&mut self, sound: &SoundRef) -> Result<()> {
        let id = self.get_sound(sound)?;
        let Some(manager) = self.manager.as_mut() else { return Ok(()); };
        if let Some(s) = self.sounds.get(id) {
            if let Err(e) = manager.play(s.data.clone().with_settings(s.settings())) {
                log::warn!("audio: failed to play {id:?}: {e}");
            }
        }
        Ok(())
    }

    /// Loop `sound` as background music, stopping whatever track was playing.
    pub fn play_music(&mut self, sound: &SoundRef) -> Result<()> {
        let id = self.get_sound(sound)?;
        self.stop_music();
        self.current_music = Some(id);
        let Some(manager) = self.manager.as_mut() else { return Ok(()); };
        let Some(s) = self.sounds.get(id) else { return Ok(()); };

        let settings = s.settings().loop_region(0.0..);
        match manager.play(s.data.clone().with_settings(settings)) {
            Ok(handle) => self.music_handle = Some(handle),
            Err(e) => log::warn!("audio: failed to play music {id:?}: {e}"),
        }
        Ok(())
    }

    pub fn stop_music(&mut self) {
        self.current_music = None;
        if let Some(mut handle) = self.music_handle.take() {
            let _ = handle.stop(Tween::default());
        }
    }

    /// Track currently set as background music.
    pub fn current_music(&self) -> Option<SoundId> {
        self.current_music
    }
}

impl Default for AudioContext {
    fn default() -> Self { Self::new(true) }
}
