//! Recitation playback state, independent of any audio backend or UI toolkit.
//!
//! A backend implements [`MediaElement`] and reports what actually happened through
//! [`MediaSignal`]s. [`AudioTransport`] issues commands to the backend, folds the signals into
//! [`PlaybackState`], and keeps a [`TransportView`] in step for whatever draws the controls.

use tracing::{debug, warn};

use crate::error::MediaError;

/// Step used by the rewind and forward controls.
pub const SEEK_STEP_SECS: f64 = 5.0;

/// Commands the transport can give to a media backend.
pub trait MediaElement {
    /// Assigns a new resource, or detaches the current one with `None`.
    fn set_source(&mut self, url: Option<&str>);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
}

/// Events reported by a media backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaSignal {
    MetadataReady { duration: f64 },
    TimeUpdate { position: f64 },
    Play,
    Pause,
    Ended,
    VolumeChange { volume: f64, muted: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// No source assigned.
    Empty,
    /// Source assigned, duration not known yet.
    Loading,
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub playing: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub volume: f64,
    pub muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            playing: false,
            position: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTier {
    Muted,
    Low,
    High,
}

impl VolumeTier {
    pub fn for_level(volume: f64, muted: bool) -> Self {
        if muted || volume <= 0.0 {
            VolumeTier::Muted
        } else if volume > 0.5 {
            VolumeTier::High
        } else {
            VolumeTier::Low
        }
    }
}

/// What the transport controls should currently show.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportView {
    pub icon: PlayIcon,
    pub volume_tier: VolumeTier,
    pub progress: f64,
    pub volume_slider: f64,
    pub elapsed: String,
    pub total: String,
}

impl Default for TransportView {
    fn default() -> Self {
        Self {
            icon: PlayIcon::Play,
            volume_tier: VolumeTier::High,
            progress: 0.0,
            volume_slider: 1.0,
            elapsed: format_time(0.0),
            total: format_time(0.0),
        }
    }
}

/// Formats seconds as `M:SS`, minutes unpadded.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Backend with no output device. Accepts every command and never plays.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMedia;

impl MediaElement for NullMedia {
    fn set_source(&mut self, _url: Option<&str>) {}

    fn play(&mut self) -> Result<(), MediaError> {
        Err(MediaError::NoSource)
    }

    fn pause(&mut self) {}
    fn seek(&mut self, _position: f64) {}
    fn set_volume(&mut self, _volume: f64) {}
    fn set_muted(&mut self, _muted: bool) {}
}

pub struct AudioTransport<M: MediaElement> {
    media: M,
    state: TransportState,
    playback: PlaybackState,
    view: TransportView,
    seek_dragging: bool,
    volume_dragging: bool,
}

impl<M: MediaElement> AudioTransport<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            state: TransportState::Empty,
            playback: PlaybackState::default(),
            view: TransportView::default(),
            seek_dragging: false,
            volume_dragging: false,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn view(&self) -> &TransportView {
        &self.view
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Back to `Empty` with default playback settings. Runs before every new verse.
    pub fn reset(&mut self) {
        self.media.pause();
        self.media.set_source(None);
        self.media.set_volume(1.0);
        self.media.set_muted(false);
        self.state = TransportState::Empty;
        self.playback = PlaybackState::default();
        self.view = TransportView::default();
        self.seek_dragging = false;
        self.volume_dragging = false;
    }

    pub fn set_source(&mut self, url: &str) {
        if self.state != TransportState::Empty {
            warn!(state = ?self.state, "Assigning audio over a loaded source; resetting first");
            self.reset();
        }
        debug!(%url, "Loading recitation");
        self.media.set_source(Some(url));
        self.state = TransportState::Loading;
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            TransportState::Empty => debug!("Play ignored: no audio source"),
            TransportState::Playing => self.media.pause(),
            TransportState::Loading | TransportState::Paused => {
                if let Err(e) = self.media.play() {
                    warn!("Audio play failed: {}", e);
                }
            }
        }
    }

    /// Moves the playhead by `delta` seconds, clamped to the track.
    pub fn seek_relative(&mut self, delta: f64) {
        let Some(duration) = self.seekable_duration() else {
            return;
        };
        let target = (self.playback.position + delta).clamp(0.0, duration);
        self.seek_to(target, duration);
    }

    /// Moves the playhead to `fraction` of the track, as the progress bar does.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let Some(duration) = self.seekable_duration() else {
            return;
        };
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        self.seek_to(fraction * duration, duration);
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 };
        self.playback.volume = volume;
        if volume > 0.0 {
            self.playback.muted = false;
        }
        self.media.set_volume(volume);
        self.media.set_muted(self.playback.muted);
        self.refresh_volume_view();
    }

    /// Flips mute without touching the stored volume, so unmuting restores it.
    pub fn toggle_mute(&mut self) {
        self.playback.muted = !self.playback.muted;
        self.media.set_muted(self.playback.muted);
        self.refresh_volume_view();
    }

    pub fn begin_seek_drag(&mut self) {
        self.seek_dragging = true;
    }

    /// Seeks to `fraction` while the progress bar is held.
    pub fn drag_seek(&mut self, fraction: f64) {
        self.seek_dragging = true;
        self.seek_to_fraction(fraction);
    }

    pub fn end_seek_drag(&mut self) {
        self.seek_dragging = false;
        self.refresh_progress_view();
    }

    pub fn begin_volume_drag(&mut self) {
        self.volume_dragging = true;
    }

    pub fn drag_volume(&mut self, volume: f64) {
        self.volume_dragging = true;
        self.set_volume(volume);
    }

    pub fn end_volume_drag(&mut self) {
        self.volume_dragging = false;
        self.refresh_volume_view();
    }

    pub fn is_dragging(&self) -> bool {
        self.seek_dragging || self.volume_dragging
    }

    pub fn handle_signal(&mut self, signal: MediaSignal) {
        match signal {
            MediaSignal::MetadataReady { duration } => {
                if self.state == TransportState::Empty {
                    debug!("Metadata for a detached source ignored");
                    return;
                }
                let duration = if duration.is_finite() && duration > 0.0 { Some(duration) } else { None };
                self.playback.duration = duration;
                self.view.total = format_time(duration.unwrap_or(0.0));
                if self.state == TransportState::Loading {
                    self.state = TransportState::Paused;
                }
                self.refresh_progress_view();
            }
            MediaSignal::TimeUpdate { position } => {
                // Nothing plays before metadata; an update now belongs to the previous track.
                if matches!(self.state, TransportState::Empty | TransportState::Loading) {
                    debug!(position, "Position update without a loaded track ignored");
                    return;
                }
                self.playback.position = position.max(0.0);
                self.refresh_progress_view();
            }
            MediaSignal::Play => {
                if self.state == TransportState::Empty {
                    return;
                }
                self.playback.playing = true;
                self.state = TransportState::Playing;
                self.view.icon = PlayIcon::Pause;
            }
            MediaSignal::Pause => {
                self.playback.playing = false;
                if self.state == TransportState::Playing {
                    self.state = TransportState::Paused;
                }
                self.view.icon = PlayIcon::Play;
            }
            MediaSignal::Ended => {
                if matches!(self.state, TransportState::Empty | TransportState::Loading) {
                    debug!("End of a detached track ignored");
                    return;
                }
                self.playback.playing = false;
                self.playback.position = 0.0;
                self.media.seek(0.0);
                self.state = TransportState::Paused;
                self.view.icon = PlayIcon::Play;
                self.refresh_progress_view();
            }
            MediaSignal::VolumeChange { volume, muted } => {
                // A held volume slider owns the value until released.
                if self.volume_dragging {
                    return;
                }
                self.playback.volume = volume.clamp(0.0, 1.0);
                self.playback.muted = muted;
                self.refresh_volume_view();
            }
        }
    }

    fn seekable_duration(&self) -> Option<f64> {
        match self.state {
            TransportState::Paused | TransportState::Playing => self.playback.duration,
            _ => None,
        }
    }

    fn seek_to(&mut self, target: f64, duration: f64) {
        self.media.seek(target);
        self.playback.position = target;
        self.view.progress = target / duration;
        self.view.elapsed = format_time(target);
    }

    fn refresh_progress_view(&mut self) {
        if self.seek_dragging {
            return;
        }
        match self.playback.duration {
            Some(duration) => {
                self.view.progress = (self.playback.position / duration).clamp(0.0, 1.0);
                self.view.elapsed = format_time(self.playback.position);
            }
            None => {
                self.view.progress = 0.0;
                self.view.elapsed = format_time(0.0);
            }
        }
    }

    fn refresh_volume_view(&mut self) {
        let PlaybackState { volume, muted, .. } = self.playback;
        self.view.volume_tier = VolumeTier::for_level(volume, muted);
        self.view.volume_slider = if muted { 0.0 } else { volume };
    }
}
