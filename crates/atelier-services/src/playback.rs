//! Recording playback through the effect chain, rendered off the UI thread

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use atelier_core::PlaybackSettings;
use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio_effects::EffectChain;
use crate::audio_io::{AudioOutputError, AudioOutputService, PlaybackHandle};
use crate::wav_codec::{decode_wav, CodecError, DecodedAudio};

const PRUNE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Decode error: {0}")]
    Codec(#[from] CodecError),
    #[error("Output error: {0}")]
    Output(#[from] AudioOutputError),
}

/// Counters shared between the UI and the playback worker
#[derive(Debug, Default)]
struct PlaybackState {
    /// Requests queued or rendering
    pending: AtomicUsize,
    /// Playbacks still sounding
    active: AtomicUsize,
    /// Bumped by `stop_all`; requests from an older generation never start
    generation: AtomicU64,
}

enum PlaybackCommand {
    Play {
        payload: Vec<u8>,
        settings: PlaybackSettings,
        generation: u64,
    },
    StopAll,
}

/// Owns every playback started from the studio. Playbacks overlap freely.
///
/// Decoding, effects and device output run on a worker thread that also owns
/// the output streams; calls from the UI only queue commands.
pub struct PlaybackService {
    state: Arc<PlaybackState>,
    commands: Option<Sender<PlaybackCommand>>,
    failures: Receiver<PlaybackError>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackService {
    pub fn new() -> Self {
        let state = Arc::new(PlaybackState::default());
        let (command_tx, command_rx) = unbounded();
        let (failure_tx, failure_rx) = unbounded();

        let worker = {
            let state = state.clone();
            thread::spawn(move || Self::run_worker(command_rx, state, failure_tx))
        };

        Self {
            state,
            commands: Some(command_tx),
            failures: failure_rx,
            worker: Some(worker),
        }
    }

    /// Decode a WAV payload and run it through the chain for `settings`
    pub fn render(payload: &[u8], settings: &PlaybackSettings) -> Result<DecodedAudio, PlaybackError> {
        let mut audio = decode_wav(payload)?;
        let mut chain = EffectChain::for_playback(settings, audio.sample_rate);
        debug!(effects = ?chain.names(), frames = audio.samples.len(), "Rendering playback");
        chain.process(&mut audio.samples);
        Ok(audio)
    }

    /// Queue a payload for playback on the default output device. Returns
    /// immediately; failures surface through [`Self::take_failures`].
    pub fn play(&self, payload: &[u8], settings: &PlaybackSettings) {
        let Some(commands) = &self.commands else {
            return;
        };
        let generation = self.state.generation.load(Ordering::SeqCst);
        self.state.pending.fetch_add(1, Ordering::SeqCst);
        let command = PlaybackCommand::Play {
            payload: payload.to_vec(),
            settings: *settings,
            generation,
        };
        if commands.send(command).is_err() {
            self.state.pending.fetch_sub(1, Ordering::SeqCst);
            warn!("Playback worker is gone");
        }
    }

    /// Silence every active playback and drop requests still rendering
    pub fn stop_all(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(commands) = &self.commands {
            let _ = commands.send(PlaybackCommand::StopAll);
        }
    }

    /// Errors from requests that failed since the last call
    pub fn take_failures(&self) -> Vec<PlaybackError> {
        self.failures.try_iter().collect()
    }

    pub fn active_count(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// True while a request is rendering or a playback is sounding
    pub fn is_playing(&self) -> bool {
        self.state.pending.load(Ordering::SeqCst) > 0 || self.active_count() > 0
    }

    fn run_worker(commands: Receiver<PlaybackCommand>, state: Arc<PlaybackState>, failures: Sender<PlaybackError>) {
        let mut active: Vec<PlaybackHandle> = Vec::new();
        let ticker = tick(PRUNE_INTERVAL);
        loop {
            select! {
                recv(commands) -> command => match command {
                    Ok(PlaybackCommand::Play { payload, settings, generation }) => {
                        match Self::start(&payload, &settings, generation, &state) {
                            Ok(Some(handle)) => active.push(handle),
                            Ok(None) => debug!("Playback cancelled before it started"),
                            Err(e) => {
                                let _ = failures.send(e);
                            }
                        }
                        Self::publish(&mut active, &state);
                        state.pending.fetch_sub(1, Ordering::SeqCst);
                    }
                    Ok(PlaybackCommand::StopAll) => {
                        for handle in active.drain(..) {
                            handle.stop();
                        }
                    }
                    Err(_) => break,
                },
                recv(ticker) -> _ => {}
            }
            Self::publish(&mut active, &state);
        }
        for handle in &active {
            handle.stop();
        }
        debug!("Playback worker exited");
    }

    fn start(
        payload: &[u8],
        settings: &PlaybackSettings,
        generation: u64,
        state: &PlaybackState,
    ) -> Result<Option<PlaybackHandle>, PlaybackError> {
        let is_current = || state.generation.load(Ordering::SeqCst) == generation;
        if !is_current() {
            return Ok(None);
        }
        let audio = Self::render(payload, settings)?;
        if !is_current() {
            return Ok(None);
        }
        info!(
            duration = audio.duration_secs(),
            enhance = settings.enhance,
            volume = settings.volume,
            "Playback started"
        );
        let handle = AudioOutputService::play_samples(audio.samples, audio.sample_rate)?;
        Ok(Some(handle))
    }

    /// Drop finished playbacks and publish the count
    fn publish(active: &mut Vec<PlaybackHandle>, state: &PlaybackState) {
        active.retain(|h| !h.is_done());
        state.active.store(active.len(), Ordering::SeqCst);
    }
}

impl Default for PlaybackService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        // Closing the command channel ends the worker
        self.commands = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Playback worker panicked");
            }
        }
    }
}
