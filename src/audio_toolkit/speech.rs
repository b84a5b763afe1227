use anyhow::{anyhow, Result};
use log::{debug, warn};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

/// Speech output capability used for spoken chat replies. One utterance at
/// a time; `speak` replaces whatever is currently playing.
pub trait SpeechSynthesizer: Send + Sync {
    /// Start speaking `text` with a BCP 47 voice tag such as "hi-IN".
    fn speak(&self, text: &str, voice: &str) -> Result<()>;
    fn stop(&self);
    fn is_speaking(&self) -> bool;
}

/// Speaks through whichever system speech command is installed, keeping the
/// child process so playback can be interrupted.
pub struct SystemSpeech {
    child: Mutex<Option<Child>>,
}

impl SystemSpeech {
    pub fn new() -> Self {
        Self {
            child: Mutex::new(None),
        }
    }

    fn kill_current(&self) {
        let mut guard = self.child.lock().unwrap();
        if let Some(mut child) = guard.take() {
            if let Err(e) = child.kill() {
                debug!("Speech process already gone: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Default for SystemSpeech {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote text as a PowerShell single-quoted literal. Inside one, only the
/// quote itself needs escaping (doubled); `$`, backtick, and `"` are inert.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn powershell_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn spawn_speaker(text: &str, voice: &str) -> Result<Child> {
    // espeak voices use bare language codes ("hi-IN" -> "hi").
    let language = voice.split('-').next().unwrap_or("en").to_lowercase();

    #[cfg(target_os = "linux")]
    {
        // Try multiple backends to increase compatibility
        // 1. espeak-ng
        if let Ok(child) = Command::new("espeak-ng")
            .args(["-v", &language, text])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            return Ok(child);
        }

        // 2. espeak
        if let Ok(child) = Command::new("espeak")
            .args(["-v", &language, text])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            return Ok(child);
        }

        // 3. speech-dispatcher (spd-say)
        if let Ok(child) = Command::new("spd-say")
            .args(["-w", "-l", &language, text])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            return Ok(child);
        }

        Err(anyhow!("no speech command found (espeak-ng/espeak/spd-say)"))
    }

    #[cfg(target_os = "macos")]
    {
        let _ = language;
        Command::new("say")
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow!("failed to run say: {}", e))
    }

    #[cfg(target_os = "windows")]
    {
        let _ = language;
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak({})",
            powershell_literal(text)
        );
        Command::new("powershell")
            .args(["-NoProfile", "-Command", &script])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow!("failed to run powershell speech: {}", e))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = (text, language);
        Err(anyhow!("speech output is not supported on this platform"))
    }
}

impl SpeechSynthesizer for SystemSpeech {
    fn speak(&self, text: &str, voice: &str) -> Result<()> {
        self.kill_current();

        let child = spawn_speaker(text, voice)?;
        debug!("Speaking {} chars with voice {}", text.len(), voice);
        *self.child.lock().unwrap() = Some(child);
        Ok(())
    }

    fn stop(&self) {
        self.kill_current();
    }

    fn is_speaking(&self) -> bool {
        let mut guard = self.child.lock().unwrap();
        match guard.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(_)) => {
                    *guard = None;
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    warn!("Failed to poll speech process: {}", e);
                    *guard = None;
                    false
                }
            },
            None => false,
        }
    }
}

impl Drop for SystemSpeech {
    fn drop(&mut self) {
        self.kill_current();
    }
}
