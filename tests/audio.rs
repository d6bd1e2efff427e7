use std::path::PathBuf;

use blitkit::audio::*;
use blitkit::error::EngineError;

/// Short silent 16-bit mono PCM clip written under the system temp dir.
fn silent_wav(name: &str) -> PathBuf {
    let samples = 100u32;
    let data_len = samples * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&16000u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    let dir = std::env::temp_dir().join(format!("blitkit-audio-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.wav"));
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn disabled_audio_has_no_device() {
    let audio = AudioContext::new(false);
    assert!(!audio.is_available());
    assert_eq!(audio.current_music(), None);
}

#[test]
fn music_is_tracked_without_a_device() {
    let mut audio = AudioContext::new(false);
    let a = audio.load_sound(silent_wav("theme-a"), Some("a"), None).unwrap();
    let b = audio.load_sound(silent_wav("theme-b"), Some("b"), Some(0.5)).unwrap();

    audio.play_music(&"a".into()).unwrap();
    assert_eq!(audio.current_music(), Some(a));
    audio.play_music(&b.into()).unwrap();
    assert_eq!(audio.current_music(), Some(b));

    audio.stop_music();
    assert_eq!(audio.current_music(), None);
}

#[test]
fn unknown_music_keeps_current_track() {
    let mut audio = AudioContext::new(false);
    let a = audio.load_sound(silent_wav("theme-keep"), Some("a"), None).unwrap();
    audio.play_music(&a.into()).unwrap();
    let err = audio.play_music(&"missing".into());
    assert!(matches!(err, Err(EngineError::SoundNotFound(n)) if n == "missing"));
    assert_eq!(audio.current_music(), Some(a));
}

#[test]
fn unreadable_sound_file_is_reported() {
    let mut audio = AudioContext::new(false);
    let err = audio.load_sound("/definitely/not/here.wav", None, None);
    assert!(matches!(err, Err(EngineError::Sound { .. })));
    assert_eq!(audio.sound_count(), 0);
}
