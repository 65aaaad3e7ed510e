/// CPAL-based output sink
use crate::device::find_device;
use crate::error::{OutputError, Result};
use cal_core::{AudioBuffer, AudioSink, DeviceInfo, StopOutcome};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// Commands sent to the audio thread
enum AudioCommand {
    /// Replace any running stream with one playing `samples`
    Play {
        device: Device,
        config: StreamConfig,
        samples: Arc<Vec<f32>>,
        reply: Sender<Result<()>>,
    },
    /// Drop the running stream; replies whether one was playing
    Stop { reply: Sender<bool> },
    /// Shutdown the audio thread
    Shutdown,
}

/// Shared state between the sink and the audio callback
struct PlaybackState {
    /// Samples emitted so far (interleaved, not frames)
    position: AtomicUsize,
    /// Set on play, cleared at end of buffer or on stop
    playing: AtomicBool,
}

impl PlaybackState {
    fn new() -> Self {
        Self {
            position: AtomicUsize::new(0),
            playing: AtomicBool::new(false),
        }
    }
}

/// cpal output sink
///
/// **Architecture**: a dedicated audio thread owns the `cpal::Stream`; the
/// sink talks to it over a bounded channel, which also serializes every
/// submission. Each `submit` opens a fresh stream on the requested device at
/// the buffer's own sample rate and channel count, so samples reach the
/// device exactly as computed. A rate the device cannot open is an error.
pub struct CpalSink {
    command_tx: Sender<AudioCommand>,
    state: Arc<PlaybackState>,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalSink {
    /// Start the audio thread
    ///
    /// # Errors
    /// `ThreadError` if the thread cannot be spawned
    pub fn new() -> Result<Self> {
        let state = Arc::new(PlaybackState::new());
        let (command_tx, command_rx) = bounded::<AudioCommand>(8);

        let state_clone = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("cal-audio-output".into())
            .spawn(move || Self::audio_thread_run(&state_clone, &command_rx))
            .map_err(|e| OutputError::ThreadError(e.to_string()))?;

        Ok(Self {
            command_tx,
            state,
            audio_thread: Some(audio_thread),
        })
    }

    /// Block until the current buffer has been emitted or stopped
    pub fn wait_until_finished(&self) {
        while self.state.playing.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Samples emitted from the current buffer
    pub fn position(&self) -> usize {
        self.state.position.load(Ordering::Relaxed)
    }

    /// Audio thread main loop
    fn audio_thread_run(state: &Arc<PlaybackState>, command_rx: &Receiver<AudioCommand>) {
        let mut stream: Option<Stream> = None;

        while let Ok(cmd) = command_rx.recv() {
            match cmd {
                AudioCommand::Play {
                    device,
                    config,
                    samples,
                    reply,
                } => {
                    // Never overlap two presentations
                    drop(stream.take());

                    state.position.store(0, Ordering::Relaxed);
                    state.playing.store(true, Ordering::Release);

                    let result = Self::start_stream(&device, &config, samples, state);
                    match result {
                        Ok(s) => {
                            stream = Some(s);
                            let _ = reply.send(Ok(()));
                        }
                        Err(e) => {
                            state.playing.store(false, Ordering::Release);
                            let _ = reply.send(Err(e));
                        }
                    }
                }
                AudioCommand::Stop { reply } => {
                    let was_playing =
                        stream.take().is_some() && state.playing.swap(false, Ordering::AcqRel);
                    state.playing.store(false, Ordering::Release);
                    state.position.store(0, Ordering::Relaxed);
                    let _ = reply.send(was_playing);
                }
                AudioCommand::Shutdown => {
                    drop(stream.take());
                    state.playing.store(false, Ordering::Release);
                    break;
                }
            }
        }
    }

    fn start_stream(
        device: &Device,
        config: &StreamConfig,
        samples: Arc<Vec<f32>>,
        state: &Arc<PlaybackState>,
    ) -> Result<Stream> {
        let state_for_callback = Arc::clone(state);
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                Self::audio_callback(data, &samples, &state_for_callback);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }

    /// Audio callback function (runs in real-time audio thread)
    fn audio_callback(output: &mut [f32], samples: &[f32], state: &PlaybackState) {
        if !state.playing.load(Ordering::Acquire) {
            output.fill(0.0);
            return;
        }

        let pos = state.position.load(Ordering::Relaxed).min(samples.len());
        let n = (samples.len() - pos).min(output.len());

        output[..n].copy_from_slice(&samples[pos..pos + n]);
        output[n..].fill(0.0);

        state.position.store(pos + n, Ordering::Relaxed);
        if pos + n >= samples.len() {
            state.playing.store(false, Ordering::Release);
        }
    }

    fn send(&self, cmd: AudioCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| OutputError::ThreadError(format!("failed to send command: {}", e)))
    }
}

impl AudioSink for CpalSink {
    fn device(&self, device_id: i32) -> cal_core::Result<DeviceInfo> {
        let (_, info) = find_device(device_id)?;
        Ok(info)
    }

    fn submit(&mut self, device_id: i32, buffer: &AudioBuffer) -> cal_core::Result<()> {
        let (device, info) = find_device(device_id)?;

        let config = StreamConfig {
            channels: buffer.format.channels,
            sample_rate: buffer.format.sample_rate.as_hz(),
            buffer_size: BufferSize::Default,
        };

        let (reply_tx, reply_rx) = bounded(1);
        self.send(AudioCommand::Play {
            device,
            config,
            samples: Arc::new(buffer.samples.clone()),
            reply: reply_tx,
        })?;

        reply_rx
            .recv()
            .map_err(|e| OutputError::ThreadError(e.to_string()))??;

        debug!(
            "Stream open on {} ({} ch @ {} Hz), {} frames",
            info.name,
            buffer.format.channels,
            buffer.format.sample_rate.as_hz(),
            buffer.frames()
        );
        Ok(())
    }

    fn stop(&mut self) -> cal_core::Result<StopOutcome> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(AudioCommand::Stop { reply: reply_tx })?;

        let was_playing = reply_rx
            .recv()
            .map_err(|e| OutputError::ThreadError(e.to_string()))?;

        if was_playing {
            info!("Output stopped");
            Ok(StopOutcome::Stopped)
        } else {
            Ok(StopOutcome::NothingPlaying)
        }
    }

    fn is_playing(&self) -> bool {
        self.state.playing.load(Ordering::Acquire)
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}
