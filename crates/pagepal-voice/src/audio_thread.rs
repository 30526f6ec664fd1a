//! Dedicated audio thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms (macOS CoreAudio among
//! them). It is created and dropped on a single OS thread, and every
//! operation is routed there as an [`AudioCommand`] over a channel. The
//! [`AudioThreadHandle`] is the `Send + Sync` proxy.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::decode::AudioClip;
use crate::error::VoiceError;
use crate::output::CompletionNotifier;
use crate::playback::AudioPlayback;

enum AudioCommand {
    /// Replace current playback with `clip` from `offset_secs`.
    Play {
        clip: Arc<AudioClip>,
        offset_secs: f64,
        notifier: CompletionNotifier,
        reply: mpsc::Sender<Result<(), VoiceError>>,
    },

    /// Fire-and-forget.
    StopPlayback,

    Shutdown,
}

/// `Send + Sync` handle to the audio thread.
///
/// Request/reply methods block the caller until the thread answers, which
/// costs a local channel round-trip plus the audio operation itself.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the thread and open the output device on it.
    ///
    /// Device errors are passed back through a one-shot init channel.
    pub fn spawn() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("pagepal-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| VoiceError::OutputDevice(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Whether the thread is still running its command loop.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn play(
        &self,
        clip: Arc<AudioClip>,
        offset_secs: f64,
        notifier: CompletionNotifier,
    ) -> Result<(), VoiceError> {
        let (reply, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::Play {
                clip,
                offset_secs,
                notifier,
                reply,
            })
            .map_err(|_| VoiceError::AudioThreadDied)?;
        rx.recv().map_err(|_| VoiceError::AudioThreadDied)?
    }

    pub fn stop_playback(&self) {
        let _ = self.cmd_tx.send(AudioCommand::StopPlayback);
    }

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
        let mut playback = match AudioPlayback::new() {
            Ok(p) => p,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play {
                    clip,
                    offset_secs,
                    notifier,
                    reply,
                } => {
                    let _ = reply.send(playback.play_from(&clip, offset_secs, notifier));
                }
                AudioCommand::StopPlayback => playback.stop(),
                AudioCommand::Shutdown => break,
            }
        }

        playback.stop();
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
