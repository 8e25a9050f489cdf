//! Playback through an opaque audio output device.

use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::pcm::DecodedAudio;

/// An audio output device that accepts decoded buffers.
///
/// Device-level buffering, start/stop and suspension are the sink's concern.
pub trait AudioSink: Send {
    /// Queues a buffer for playback.
    fn play(&mut self, audio: &DecodedAudio) -> Result<(), Error>;

    /// Stops any audio currently playing.
    fn stop(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

type OpenSink<S> = Box<dyn Fn() -> Result<S, Error> + Send + Sync>;

/// Handle to an output device that is opened on first use and reused after.
///
/// Create one per session and share it. Calls to [`Player::play`] are
/// serialized, so at most one buffer is handed to the sink at a time.
pub struct Player<S> {
    open: OpenSink<S>,
    sink: Mutex<Option<S>>,
    play_count: AtomicU32,
    session_id: String,
}

impl<S: AudioSink> Player<S> {
    /// Creates a player that opens its sink with `open` when first needed.
    pub fn new<F>(open: F) -> Self
    where
        F: Fn() -> Result<S, Error> + Send + Sync + 'static,
    {
        Self {
            open: Box::new(open),
            sink: Mutex::new(None),
            play_count: AtomicU32::new(0),
            session_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
        }
    }

    /// Plays a decoded buffer, opening the sink if it is not open yet.
    pub async fn play(&self, audio: &DecodedAudio) -> Result<(), Error> {
        let mut guard = self.sink.lock().await;
        if guard.is_none() {
            info!(session_id = %self.session_id, "Opening audio sink");
            let sink = (self.open)().map_err(|e| {
                error!(session_id = %self.session_id, error = %e, "Failed to open audio sink");
                e
            })?;
            *guard = Some(sink);
        }
        let sink = guard.as_mut().ok_or(Error::NotReady)?;

        debug!(
            session_id = %self.session_id,
            frames = audio.frames(),
            channels = audio.channel_count(),
            sample_rate = audio.sample_rate(),
            "Playing audio"
        );
        if let Err(e) = sink.play(audio) {
            error!(session_id = %self.session_id, error = %e, "Audio sink failed");
            return Err(e);
        }
        self.play_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Stops playback on the open sink. Does nothing if no sink is open.
    pub async fn stop(&self) -> Result<(), Error> {
        match self.sink.lock().await.as_mut() {
            Some(sink) => {
                debug!(session_id = %self.session_id, "Stopping audio");
                sink.stop()
            }
            None => Ok(()),
        }
    }

    /// Stops and releases the sink. The next `play` opens a new one.
    pub async fn close(&self) {
        if let Some(mut sink) = self.sink.lock().await.take() {
            if let Err(e) = sink.stop() {
                error!(session_id = %self.session_id, error = %e, "Failed to stop audio sink");
            }
            info!(session_id = %self.session_id, "Audio sink closed");
        }
    }

    /// Returns true if the sink has been opened and not closed.
    pub async fn is_open(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    /// Number of buffers successfully handed to the sink.
    pub fn play_count(&self) -> u32 {
        self.play_count.load(Ordering::SeqCst)
    }

    /// Short identifier used in log fields.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
