use crate::api::ApiClient;
use crate::audio_toolkit::{CpalRecorder, SystemSpeech};
use crate::chat::{voice_for, ChatMessage, ChatSession, Sender};
use crate::managers::{PlaybackManager, RecordingManager};
use crate::settings::AppSettings;
use log::{error, warn};
use std::io::{BufRead, Write};
use std::sync::Arc;

pub async fn run(settings: &AppSettings, voice: bool) -> anyhow::Result<()> {
    let api = ApiClient::new(&settings.backend_url)?;
    let playback = PlaybackManager::new(Arc::new(SystemSpeech::new()));
    let recording = RecordingManager::new(Arc::new(CpalRecorder::new()));
    let mut session = ChatSession::from_token(settings.auth_token.as_deref());

    let greeting = session.open(&api).await;
    print_bot(0, &greeting);
    if voice {
        speak_latest(&playback, &session, settings);
    }

    println!("Ask something... (/voice to dictate, /play <n> to hear a reply, /quit to leave)");
    prompt()?;

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    while let Some(line) = lines.next() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed == "/quit" || trimmed == "/q" {
            break;
        }

        if let Some(arg) = trimmed.strip_prefix("/play") {
            play_message(&playback, &session, settings, arg.trim());
            prompt()?;
            continue;
        }

        let message = if trimmed == "/voice" {
            match dictate(settings, &api, &recording, &mut lines).await {
                Some(text) => {
                    // Dictation fills the input; the user still confirms it.
                    print!("Press Enter to send, or type a replacement: ");
                    std::io::stdout().flush()?;
                    match lines.next() {
                        Some(edit) => {
                            let edit = edit?;
                            if edit.trim().is_empty() {
                                text
                            } else {
                                edit
                            }
                        }
                        None => break,
                    }
                }
                None => {
                    prompt()?;
                    continue;
                }
            }
        } else {
            line.clone()
        };

        if !message.trim().is_empty() {
            println!("🤖 Thinking...");
        }
        if let Some(reply) = session.send(&api, &message).await {
            let index = session.transcript().len() - 1;
            print_bot(index, &reply);
            if voice {
                speak_latest(&playback, &session, settings);
            }
        }
        prompt()?;
    }

    playback.stop();
    Ok(())
}

fn prompt() -> anyhow::Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_bot(index: usize, message: &ChatMessage) {
    let at = message.at.with_timezone(&chrono::Local);
    println!("[{}] {} 🤖 {}", index, at.format("%H:%M"), message.text);
}

fn voice_tag(settings: &AppSettings, lang: Option<&str>) -> String {
    match lang {
        Some(code) => voice_for(Some(code)).to_string(),
        None => settings.speech_language.clone(),
    }
}

fn speak_latest(playback: &PlaybackManager, session: &ChatSession, settings: &AppSettings) {
    let transcript = session.transcript();
    if let Some((index, message)) = transcript
        .iter()
        .enumerate()
        .rev()
        .find(|(_, m)| m.sender == Sender::Bot)
    {
        let tag = voice_tag(settings, message.lang.as_deref());
        if let Err(e) = playback.toggle(index, &message.text, &tag) {
            warn!("Speech failed: {}", e);
            println!("Speech error");
        }
    }
}

fn play_message(
    playback: &PlaybackManager,
    session: &ChatSession,
    settings: &AppSettings,
    arg: &str,
) {
    let index: usize = match arg.parse() {
        Ok(n) => n,
        Err(_) => {
            println!("Usage: /play <n>");
            return;
        }
    };

    match session.transcript().get(index) {
        Some(message) if message.sender == Sender::Bot => {
            let tag = voice_tag(settings, message.lang.as_deref());
            match playback.toggle(index, &message.text, &tag) {
                Ok(Some(_)) => {}
                Ok(None) => println!("Stopped"),
                Err(e) => {
                    warn!("Speech failed: {}", e);
                    println!("Speech error");
                }
            }
        }
        _ => println!("No bot reply at position {}", index),
    }
}

/// Record from the microphone until the next Enter, then hand the audio to
/// the speech-to-text endpoint. Failures are reported inline and leave the
/// conversation untouched.
async fn dictate(
    settings: &AppSettings,
    api: &ApiClient,
    recording: &RecordingManager,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> Option<String> {
    if let Err(e) = recording.start(settings.selected_microphone.as_deref()) {
        error!("Recording failed: {}", e);
        println!("🎙️ Mic access denied");
        return None;
    }

    println!("Listening... press Enter to stop.");
    lines.next();

    let clip = match recording.stop() {
        Ok(clip) => clip,
        Err(e) => {
            error!("Recording failed: {}", e);
            println!("🎙️ Mic access denied");
            return None;
        }
    };

    println!("⏳ Transcribing...");
    match api.speech_to_text(&clip).await {
        Ok(result) => {
            if let Some(lang) = &result.language {
                println!("🎤 Detected: {}", lang);
            }
            println!("You said: {}", result.transcription);
            Some(result.transcription)
        }
        Err(e) => {
            error!("Voice to text failed: {}", e);
            println!("❌ Voice to text failed");
            None
        }
    }
}
