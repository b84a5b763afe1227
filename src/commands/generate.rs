use crate::api::ApiClient;
use crate::audio_toolkit::{load_wav_file, save_wav_file, CpalRecorder};
use crate::describe::render_description;
use crate::dialog::GenerationDialog;
use crate::managers::RecordingManager;
use crate::settings::AppSettings;
use anyhow::Context;
use log::error;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub struct GenerateOpts {
    pub images: Vec<PathBuf>,
    pub text: Option<String>,
    pub audio: Option<PathBuf>,
    pub save_audio: Option<PathBuf>,
    pub save: bool,
    pub sheet: bool,
}

pub async fn run(settings: &AppSettings, opts: GenerateOpts) -> anyhow::Result<()> {
    let api = ApiClient::new(&settings.backend_url)?;
    let recording = RecordingManager::new(Arc::new(CpalRecorder::new()));
    let mut dialog = GenerationDialog::new(recording);

    for path in &opts.images {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !dialog.attach_image(&name, bytes) {
            anyhow::bail!("{} does not look like an image file", path.display());
        }
    }
    println!("📷 Attached {} image(s)", dialog.images().len());

    if let Some(text) = &opts.text {
        dialog.set_voice_text(text);
    } else if let Some(path) = &opts.audio {
        let clip =
            load_wav_file(path).with_context(|| format!("reading audio {}", path.display()))?;
        println!("⏳ Transcribing...");
        let result = dialog.transcribe_clip(&api, &clip).await?;
        if let Some(lang) = &result.language {
            println!("🎤 Detected: {}", lang);
        }
    } else if !record_voice_note(settings, &api, &mut dialog, opts.save_audio.as_deref()).await? {
        println!("Recording cancelled");
        return Ok(());
    }
    println!("🗣 Voice note: {}", dialog.voice_text());

    println!("Generating...");
    let listing = dialog.submit(&api).await?;
    println!("\n{}\n", render_description(&listing.description));

    // The two saves are independent; one failing does not stop the other.
    if opts.save {
        match listing.save_to_db(&api).await {
            Ok(message) => println!(
                "✅ {}",
                message.unwrap_or_else(|| "Saved to DB with images".to_string())
            ),
            Err(e) => {
                error!("Save to DB failed: {}", e);
                println!("❌ Failed to save to DB.");
            }
        }
    }
    if opts.sheet {
        match listing.save_to_sheet(&api).await {
            Ok(message) => println!(
                "✅ {}",
                message.unwrap_or_else(|| "Saved to Google Sheets".to_string())
            ),
            Err(e) => {
                error!("Save to sheet failed: {}", e);
                println!("❌ Failed to save to sheet.");
            }
        }
    }

    Ok(())
}

/// Live recording flow. Returns false when the user cancelled instead of
/// stopping, in which case nothing was transcribed.
async fn record_voice_note(
    settings: &AppSettings,
    api: &ApiClient,
    dialog: &mut GenerationDialog,
    save_audio: Option<&std::path::Path>,
) -> anyhow::Result<bool> {
    dialog.start_voice_note(settings.selected_microphone.as_deref())?;
    println!("🎙 Listening... press Enter to stop, c to cancel.");
    if read_line()?.trim().eq_ignore_ascii_case("c") {
        dialog.cancel_voice_note();
        return Ok(false);
    }

    let clip = dialog.stop_voice_note()?;
    if let Some(path) = save_audio {
        save_wav_file(path, &clip)?;
        println!("Saved voice note to {}", path.display());
    }

    println!("⏳ Transcribing...");
    let result = dialog.transcribe_clip(api, &clip).await?;
    if let Some(lang) = &result.language {
        println!("🎤 Detected: {}", lang);
    }

    println!("Transcription: {}", dialog.voice_text());
    print!("Press Enter to keep it, or type a replacement: ");
    let edit = read_line()?;
    if !edit.trim().is_empty() {
        dialog.set_voice_text(edit.trim());
    }
    Ok(true)
}

fn read_line() -> anyhow::Result<String> {
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
