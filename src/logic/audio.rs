//! Music playback and stroke samples.
//!
//! The gameplay session only talks to the [`MusicPlayer`] trait. The rodio
//! backend degrades to silence when there is no output device or the file
//! cannot be decoded, so a session never fails because of audio.

use crate::models::engine::NoteKind;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Controls the session needs from the audio collaborator.
pub trait MusicPlayer {
    /// Starts (or resumes) the loaded track.
    fn play(&mut self);
    /// Stops playback for good.
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    /// Ramps the volume down to silence over `seconds`.
    fn fade_out(&mut self, seconds: f64);
    /// Advances time-based effects such as fades.
    fn update(&mut self, dt: f64);
    /// Plays the sample attached to a note category.
    fn play_effect(&mut self, kind: NoteKind);
}

/// Player used when audio is disabled (autoplay, tests, missing device).
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl MusicPlayer for SilentPlayer {
    fn play(&mut self) {}
    fn stop(&mut self) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn fade_out(&mut self, _seconds: f64) {}
    fn update(&mut self, _dt: f64) {}
    fn play_effect(&mut self, _kind: NoteKind) {}
}

/// Linear volume ramp to zero.
#[derive(Debug, Clone, Copy)]
struct Fade {
    elapsed: f64,
    duration: f64,
    from: f32,
}

impl Fade {
    fn volume(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let progress = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from * (1.0 - progress as f32)
    }

    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

pub struct RodioPlayer {
    _stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    volume: f32,
    fade: Option<Fade>,
    sounds_dir: PathBuf,
}

impl RodioPlayer {
    /// Opens the default output device and loads `music_path` paused.
    pub fn new(music_path: &Path, sounds_dir: &Path, volume: f32) -> Self {
        let mut player = match OutputStream::try_default() {
            Ok((stream, stream_handle)) => {
                log::info!("AUDIO: Device found, audio enabled");
                Self {
                    _stream: Some(stream),
                    stream_handle: Some(stream_handle),
                    sink: None,
                    volume,
                    fade: None,
                    sounds_dir: sounds_dir.to_path_buf(),
                }
            }
            Err(e) => {
                log::warn!("AUDIO: No audio device found ({}), running in silent mode", e);
                Self {
                    _stream: None,
                    stream_handle: None,
                    sink: None,
                    volume,
                    fade: None,
                    sounds_dir: sounds_dir.to_path_buf(),
                }
            }
        };
        player.load_music(music_path);
        player
    }

    fn load_music(&mut self, path: &Path) {
        let Some(handle) = &self.stream_handle else {
            return;
        };

        let source = match File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|f| Decoder::new(BufReader::new(f)).map_err(|e| e.to_string()))
        {
            Ok(source) => source,
            Err(e) => {
                log::error!("AUDIO: Failed to load {:?}: {}", path, e);
                return;
            }
        };

        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.pause();
                sink.set_volume(self.volume);
                sink.append(source);
                self.sink = Some(sink);
                log::info!("AUDIO: Loaded {:?}", path);
            }
            Err(e) => log::error!("AUDIO: Unable to create sink: {}", e),
        }
    }
}

impl MusicPlayer for RodioPlayer {
    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) {
        self.fade = None;
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn fade_out(&mut self, seconds: f64) {
        self.fade = Some(Fade {
            elapsed: 0.0,
            duration: seconds,
            from: self.volume,
        });
    }

    fn update(&mut self, dt: f64) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        fade.elapsed += dt;
        let volume = fade.volume();
        let done = fade.is_done();
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
        if done {
            self.fade = None;
        }
    }

    fn play_effect(&mut self, kind: NoteKind) {
        let Some(handle) = &self.stream_handle else {
            return;
        };
        let path = self.sounds_dir.join(kind.sound_file());
        if !path.exists() {
            log::debug!("AUDIO: {:?} not found, stroke is silent", path);
            return;
        }
        let result = File::open(&path)
            .map_err(|e| e.to_string())
            .and_then(|f| Decoder::new(BufReader::new(f)).map_err(|e| e.to_string()))
            .and_then(|source| {
                handle
                    .play_raw(source.convert_samples::<f32>().amplify(self.volume))
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            log::warn!("AUDIO: Failed to play {:?}: {}", path, e);
        }
    }
}
