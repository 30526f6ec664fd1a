//! Speaker output via `rodio`.
//!
//! [`AudioPlayback`] owns the output stream and must stay on the thread that
//! created it; [`RodioOutput`] is the thread-safe [`AudioOutput`] that drives
//! it through [`AudioThreadHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::audio_thread::AudioThreadHandle;
use crate::decode::AudioClip;
use crate::error::VoiceError;
use crate::output::{AudioOutput, CompletionNotifier};

/// A started sink plus the flag its watcher checks on drain.
struct ActiveSink {
    sink: Arc<Sink>,
    active: Arc<AtomicBool>,
}

/// Playback on the default output device.
pub struct AudioPlayback {
    /// Must be kept alive for the handle to produce sound.
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    current: Option<ActiveSink>,
}

impl AudioPlayback {
    /// Open the default output device.
    pub fn new() -> Result<Self, VoiceError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| VoiceError::OutputDevice(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            current: None,
        })
    }

    /// Stop whatever is playing and play `clip` from `offset_secs`.
    ///
    /// A watcher thread calls `notifier.notify()` when the sink drains on its
    /// own. Stopping the sink first clears its `active` flag, so an
    /// interrupted clip never reports completion.
    pub fn play_from(
        &mut self,
        clip: &AudioClip,
        offset_secs: f64,
        notifier: CompletionNotifier,
    ) -> Result<(), VoiceError> {
        self.stop();

        let sink =
            Sink::try_new(&self.stream_handle).map_err(|e| VoiceError::OutputDevice(e.to_string()))?;

        let offset_secs = if offset_secs.is_finite() {
            offset_secs.clamp(0.0, clip.duration())
        } else {
            0.0
        };
        let offset = Duration::from_secs_f64(offset_secs);
        let source = SamplesBuffer::new(clip.channels, clip.sample_rate, clip.samples.clone())
            .skip_duration(offset);
        sink.append(source);

        let sink = Arc::new(sink);
        let active = Arc::new(AtomicBool::new(true));
        Self::spawn_completion_watcher(Arc::clone(&sink), Arc::clone(&active), notifier);
        self.current = Some(ActiveSink { sink, active });

        tracing::debug!(offset_secs, sample_rate = clip.sample_rate, "Audio playback started");
        Ok(())
    }

    fn spawn_completion_watcher(
        sink: Arc<Sink>,
        active: Arc<AtomicBool>,
        notifier: CompletionNotifier,
    ) {
        // `sleep_until_end` also returns when the sink is stopped; the flag
        // separates that case from a natural drain.
        std::thread::spawn(move || {
            sink.sleep_until_end();
            if !active.swap(false, Ordering::SeqCst) {
                return;
            }
            tracing::debug!(session = %notifier.session(), "Playback finished naturally");
            notifier.notify();
        });
    }

    /// Stop any active playback immediately.
    pub fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.active.store(false, Ordering::SeqCst);
            current.sink.stop();
            tracing::debug!("Audio playback stopped");
        }
    }
}

/// [`AudioOutput`] backed by a lazily spawned audio thread.
///
/// The thread (and with it the output device) is created on the first
/// [`prepare`](AudioOutput::prepare) and reused afterwards. If it dies it is
/// spawned again on the next prepare.
#[derive(Default)]
pub struct RodioOutput {
    thread: Mutex<Option<AudioThreadHandle>>,
}

impl RodioOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_thread<T>(
        &self,
        f: impl FnOnce(&AudioThreadHandle) -> Result<T, VoiceError>,
    ) -> Result<T, VoiceError> {
        let guard = self.thread.lock().map_err(|_| VoiceError::AudioThreadDied)?;
        let handle = guard.as_ref().ok_or(VoiceError::AudioThreadDied)?;
        f(handle)
    }
}

impl AudioOutput for RodioOutput {
    fn prepare(&self) -> Result<(), VoiceError> {
        let mut guard = self.thread.lock().map_err(|_| VoiceError::AudioThreadDied)?;
        if guard.as_ref().is_some_and(AudioThreadHandle::is_alive) {
            return Ok(());
        }
        *guard = Some(AudioThreadHandle::spawn()?);
        Ok(())
    }

    fn start(
        &self,
        clip: Arc<AudioClip>,
        offset_secs: f64,
        notifier: CompletionNotifier,
    ) -> Result<(), VoiceError> {
        self.with_thread(|handle| handle.play(clip, offset_secs, notifier))
    }

    fn stop(&self) -> Result<(), VoiceError> {
        let guard = self.thread.lock().map_err(|_| VoiceError::AudioThreadDied)?;
        if let Some(handle) = guard.as_ref() {
            handle.stop_playback();
        }
        Ok(())
    }
}
