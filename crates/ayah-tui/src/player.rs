//! Recitation playback through `rodio`.
//!
//! The MP3 is downloaded once per verse and kept in memory. Seeking rebuilds the sink from
//! those bytes, and the playhead is tracked against a monotonic clock.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use ayah_core::{MediaElement, MediaError, MediaSignal};
use reqwest::Client;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::tui::AppEvent;

/// Shared MP3 bytes readable through a `Cursor` without copying.
#[derive(Clone)]
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

struct Track {
    bytes: Arc<[u8]>,
    duration: f64,
}

#[derive(Debug, Default)]
struct PlayClock {
    base: f64,
    started: Option<Instant>,
}

impl PlayClock {
    fn position(&self) -> f64 {
        self.base + self.started.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0)
    }

    fn running(&self) -> bool {
        self.started.is_some()
    }

    fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.base = self.position();
        self.started = None;
    }

    fn set(&mut self, position: f64) {
        self.base = position;
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }
}

pub struct RodioMedia {
    client: Client,
    events: mpsc::UnboundedSender<AppEvent>,
    generation: u64,
    loader: Option<JoinHandle<()>>,
    source_url: Option<String>,
    track: Option<Track>,
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    clock: PlayClock,
    volume: f64,
    muted: bool,
}

impl RodioMedia {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            client: Client::new(),
            events,
            generation: 0,
            loader: None,
            source_url: None,
            track: None,
            output: None,
            sink: None,
            clock: PlayClock::default(),
            volume: 1.0,
            muted: false,
        }
    }

    /// Accepts a finished download. Loads for a superseded source are dropped.
    pub fn finish_load(&mut self, generation: u64, bytes: Arc<[u8]>, duration: f64) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Dropping stale recitation download");
            return;
        }
        info!(duration, size = bytes.len(), "Recitation ready");
        self.loader = None;
        self.track = Some(Track { bytes, duration });
        self.emit(MediaSignal::MetadataReady { duration });
    }

    pub fn fail_load(&mut self, generation: u64, error: &str) {
        if generation != self.generation {
            return;
        }
        self.loader = None;
        warn!(url = ?self.source_url, "Recitation download failed: {}", error);
    }

    /// Reports the playhead while playing, and the end of the track once the sink drains.
    pub fn tick(&mut self) {
        if !self.clock.running() {
            return;
        }
        let drained = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if drained {
            self.clock.stop();
            self.sink = None;
            self.emit(MediaSignal::Ended);
            return;
        }
        let duration = self.track.as_ref().map(|t| t.duration).unwrap_or(0.0);
        let position = self.clock.position().min(duration);
        self.emit(MediaSignal::TimeUpdate { position });
    }

    /// Identifies the current source. Bumped whenever the source is replaced or detached.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn emit(&self, signal: MediaSignal) {
        let _ = self.events.send(AppEvent::Media {
            generation: self.generation,
            signal,
        });
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume as f32
        }
    }

    fn detach(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.abort();
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.generation += 1;
        self.source_url = None;
        self.track = None;
        self.clock = PlayClock::default();
    }

    fn ensure_output(&mut self) -> Result<&OutputStreamHandle, MediaError> {
        if self.output.is_none() {
            let output = OutputStream::try_default()
                .map_err(|e| MediaError::Rejected(format!("no audio output: {}", e)))?;
            self.output = Some(output);
        }
        match &self.output {
            Some((_, handle)) => Ok(handle),
            None => Err(MediaError::Rejected("no audio output".to_string())),
        }
    }

    /// New paused sink positioned at `position` seconds.
    fn build_sink(&mut self, position: f64) -> Result<Sink, MediaError> {
        let bytes = match &self.track {
            Some(track) => track.bytes.clone(),
            None => return Err(MediaError::NotReady),
        };
        let volume = self.effective_volume();
        let handle = self.ensure_output()?;

        let sink = Sink::try_new(handle).map_err(|e| MediaError::Rejected(e.to_string()))?;
        let source = Decoder::new(Cursor::new(SharedBytes(bytes)))
            .map_err(|e| MediaError::Rejected(format!("undecodable audio: {}", e)))?;

        sink.pause();
        sink.set_volume(volume);
        sink.append(source.skip_duration(Duration::from_secs_f64(position.max(0.0))));
        Ok(sink)
    }
}

impl MediaElement for RodioMedia {
    fn set_source(&mut self, url: Option<&str>) {
        self.detach();
        let Some(url) = url else {
            return;
        };

        self.source_url = Some(url.to_string());
        let generation = self.generation;
        let client = self.client.clone();
        let events = self.events.clone();
        let url = url.to_string();

        self.loader = Some(tokio::spawn(async move {
            let event = match download(&client, &url).await {
                Ok((bytes, duration)) => AppEvent::MediaLoaded {
                    generation,
                    bytes,
                    duration,
                },
                Err(e) => AppEvent::MediaFailed {
                    generation,
                    error: format!("{:#}", e),
                },
            };
            let _ = events.send(event);
        }));
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if self.source_url.is_none() {
            return Err(MediaError::NoSource);
        }
        if self.track.is_none() {
            return Err(MediaError::NotReady);
        }
        if self.clock.running() {
            return Ok(());
        }

        if self.sink.is_none() {
            let sink = self.build_sink(self.clock.position())?;
            self.sink = Some(sink);
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.clock.start();
        self.emit(MediaSignal::Play);
        Ok(())
    }

    fn pause(&mut self) {
        if !self.clock.running() {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.clock.stop();
        self.emit(MediaSignal::Pause);
    }

    fn seek(&mut self, position: f64) {
        if self.track.is_none() {
            return;
        }
        self.clock.set(position);

        if self.sink.is_some() {
            let playing = self.clock.running();
            match self.build_sink(position) {
                Ok(sink) => {
                    if playing {
                        sink.play();
                    }
                    if let Some(old) = self.sink.replace(sink) {
                        old.stop();
                    }
                }
                Err(e) => warn!("Seek failed: {}", e),
            }
        }
        self.emit(MediaSignal::TimeUpdate { position });
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(self.effective_volume());
        }
        self.emit(MediaSignal::VolumeChange {
            volume,
            muted: self.muted,
        });
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(sink) = &self.sink {
            sink.set_volume(self.effective_volume());
        }
        self.emit(MediaSignal::VolumeChange {
            volume: self.volume,
            muted,
        });
    }
}

async fn download(client: &Client, url: &str) -> Result<(Arc<[u8]>, f64)> {
    debug!(%url, "Downloading recitation");
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("Audio request failed with status {}", response.status()));
    }

    let body = response.bytes().await?;
    let bytes: Arc<[u8]> = Arc::from(&body[..]);
    let measured = bytes.clone();
    let duration = tokio::task::spawn_blocking(move || measure_duration(measured))
        .await
        .context("Measuring recitation")??;

    Ok((bytes, duration))
}

/// Track length in seconds. MP3 streams rarely declare it, so count samples when absent.
fn measure_duration(bytes: Arc<[u8]>) -> Result<f64> {
    let decoder = Decoder::new(Cursor::new(SharedBytes(bytes))).context("Decoding recitation")?;
    if let Some(total) = decoder.total_duration() {
        return Ok(total.as_secs_f64());
    }

    let channels = decoder.channels().max(1) as f64;
    let rate = decoder.sample_rate().max(1) as f64;
    let samples = decoder.count() as f64;
    Ok(samples / (channels * rate))
}
