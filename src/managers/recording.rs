use crate::audio_toolkit::{AudioClip, AudioInput, TARGET_SAMPLE_RATE};
use crate::error::{Error, Result};
use log::{debug, error};
use std::sync::{Arc, Mutex};

/* ──────────────────────────────────────────────────────────────── */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
    Stopped,
    Cancelled,
}

impl RecordingState {
    fn is_startable(self) -> bool {
        !matches!(self, RecordingState::Recording)
    }
}

/* ──────────────────────────────────────────────────────────────── */

/// Owns one microphone capture lifecycle at a time. The device is claimed
/// on `start` and released on every exit path; `stop` hands the captured
/// samples out exactly once.
pub struct RecordingManager {
    input: Arc<dyn AudioInput>,
    state: Arc<Mutex<RecordingState>>,
    is_open: Arc<Mutex<bool>>,
}

impl RecordingManager {
    pub fn new(input: Arc<dyn AudioInput>) -> Self {
        Self {
            input,
            state: Arc::new(Mutex::new(RecordingState::Idle)),
            is_open: Arc::new(Mutex::new(false)),
        }
    }

    pub fn state(&self) -> RecordingState {
        *self.state.lock().unwrap()
    }

    pub fn is_recording(&self) -> bool {
        matches!(*self.state.lock().unwrap(), RecordingState::Recording)
    }

    /* ---------- microphone life-cycle -------------------------------------- */

    fn open_input(&self, preferred_device: Option<&str>) -> Result<()> {
        let mut open_flag = self.is_open.lock().unwrap();
        if *open_flag {
            debug!("Microphone already open");
            return Ok(());
        }

        self.input
            .open(preferred_device)
            .map_err(|e| Error::PermissionDenied(e.to_string()))?;
        *open_flag = true;
        Ok(())
    }

    fn close_input(&self) {
        let mut open_flag = self.is_open.lock().unwrap();
        if !*open_flag {
            return;
        }

        if let Err(e) = self.input.close() {
            error!("Failed to close microphone: {}", e);
        }
        *open_flag = false;
        debug!("Microphone released");
    }

    /* ---------- recording --------------------------------------------------- */

    pub fn start(&self, preferred_device: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.is_startable() {
            return Err(Error::InvalidState("already recording"));
        }

        self.open_input(preferred_device)?;

        if let Err(e) = self.input.start() {
            self.close_input();
            return Err(Error::PermissionDenied(e.to_string()));
        }

        *state = RecordingState::Recording;
        debug!("Recording started");
        Ok(())
    }

    pub fn stop(&self) -> Result<AudioClip> {
        let mut state = self.state.lock().unwrap();
        if !matches!(*state, RecordingState::Recording) {
            return Err(Error::InvalidState("not recording"));
        }

        let samples = match self.input.stop() {
            Ok(buf) => buf,
            Err(e) => {
                error!("stop() failed: {}", e);
                Vec::new()
            }
        };

        self.close_input();
        *state = RecordingState::Stopped;
        debug!("Recording stopped with {} samples", samples.len());

        Ok(AudioClip {
            samples,
            sample_rate: TARGET_SAMPLE_RATE,
        })
    }

    /// Cancel any ongoing recording without returning audio samples.
    /// No-op when not recording.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if !matches!(*state, RecordingState::Recording) {
            return;
        }

        if let Err(e) = self.input.stop() {
            error!("stop() failed during cancel: {}", e);
        }

        self.close_input();
        *state = RecordingState::Cancelled;
        debug!("Recording cancelled, samples discarded");
    }
}

impl Drop for RecordingManager {
    fn drop(&mut self) {
        self.cancel();
        self.close_input();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeInput {
        buffer: Mutex<Vec<f32>>,
        opens: AtomicUsize,
        closes: AtomicUsize,
        fail_open: bool,
    }

    impl FakeInput {
        fn refusing() -> Self {
            Self {
                fail_open: true,
                ..Self::default()
            }
        }

        fn push_chunk(&self, chunk: &[f32]) {
            self.buffer.lock().unwrap().extend_from_slice(chunk);
        }
    }

    impl AudioInput for FakeInput {
        fn open(&self, _preferred_device: Option<&str>) -> anyhow::Result<()> {
            if self.fail_open {
                return Err(anyhow!("device refused"));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn start(&self) -> anyhow::Result<()> {
            self.buffer.lock().unwrap().clear();
            Ok(())
        }

        fn stop(&self) -> anyhow::Result<Vec<f32>> {
            Ok(std::mem::take(&mut *self.buffer.lock().unwrap()))
        }

        fn close(&self) -> anyhow::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_start_stop_returns_chunks_in_order() {
        let input = Arc::new(FakeInput::default());
        let manager = RecordingManager::new(input.clone());

        manager.start(None).unwrap();
        input.push_chunk(&[1.0, 2.0]);
        input.push_chunk(&[3.0]);

        let clip = manager.stop().unwrap();
        assert_eq!(clip.samples, vec![1.0, 2.0, 3.0]);
        assert_eq!(clip.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(manager.state(), RecordingState::Stopped);
        assert_eq!(input.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_discards_samples_and_releases_device() {
        let input = Arc::new(FakeInput::default());
        let manager = RecordingManager::new(input.clone());

        manager.start(None).unwrap();
        input.push_chunk(&[1.0, 2.0, 3.0]);
        manager.cancel();

        assert_eq!(manager.state(), RecordingState::Cancelled);
        assert_eq!(input.closes.load(Ordering::SeqCst), 1);

        // Startable again, and the discarded take never resurfaces.
        manager.start(None).unwrap();
        let clip = manager.stop().unwrap();
        assert!(clip.samples.is_empty());
    }

    #[test]
    fn test_start_while_recording_is_rejected() {
        let input = Arc::new(FakeInput::default());
        let manager = RecordingManager::new(input);

        manager.start(None).unwrap();
        assert!(matches!(
            manager.start(None),
            Err(Error::InvalidState(_))
        ));
        assert!(manager.is_recording());
    }

    #[test]
    fn test_stop_when_idle_is_rejected() {
        let input = Arc::new(FakeInput::default());
        let manager = RecordingManager::new(input);

        assert!(matches!(manager.stop(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_stop_hands_payload_out_exactly_once() {
        let input = Arc::new(FakeInput::default());
        let manager = RecordingManager::new(input.clone());

        manager.start(None).unwrap();
        input.push_chunk(&[0.5]);
        manager.stop().unwrap();

        // A second stop without a new start yields no payload.
        assert!(matches!(manager.stop(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_refused_device_maps_to_permission_denied() {
        let input = Arc::new(FakeInput::refusing());
        let manager = RecordingManager::new(input);

        assert!(matches!(
            manager.start(None),
            Err(Error::PermissionDenied(_))
        ));
        // Still startable; the failure left no half-open session behind.
        assert_eq!(manager.state(), RecordingState::Idle);
    }

    #[test]
    fn test_cancel_when_idle_is_a_noop() {
        let input = Arc::new(FakeInput::default());
        let manager = RecordingManager::new(input.clone());

        manager.cancel();
        assert_eq!(manager.state(), RecordingState::Idle);
        assert_eq!(input.closes.load(Ordering::SeqCst), 0);
    }
}
