use crate::chat::user_id_from_token;
use crate::cli::ConfigAction;
use crate::settings::{get_settings, write_settings};

pub fn run(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = get_settings();
            println!("Settings:");
            println!("  Backend URL: {}", settings.backend_url);
            println!(
                "  Microphone: {}",
                settings
                    .selected_microphone
                    .as_deref()
                    .unwrap_or("system default")
            );
            println!("  Speech language: {}", settings.speech_language);
            match settings.auth_token.as_deref() {
                Some(token) => match user_id_from_token(token) {
                    Some(user_id) => println!("  Auth token: set (user {})", user_id),
                    None => println!("  Auth token: set (no user_id claim)"),
                },
                None => println!("  Auth token: not set"),
            }
        }
        ConfigAction::SetBackend { url } => {
            let mut settings = get_settings();
            settings.backend_url = url;
            write_settings(&settings)?;
            println!("✔ Backend URL updated");
        }
        ConfigAction::SetMicrophone { name } => {
            let mut settings = get_settings();
            settings.selected_microphone = Some(name);
            write_settings(&settings)?;
            println!("✔ Microphone updated");
        }
        ConfigAction::SetLanguage { lang } => {
            let mut settings = get_settings();
            settings.speech_language = lang;
            write_settings(&settings)?;
            println!("✔ Speech language updated");
        }
        ConfigAction::SetToken { token } => {
            let mut settings = get_settings();
            if user_id_from_token(&token).is_none() {
                println!("Token has no readable user_id claim, chat will be anonymous");
            }
            settings.auth_token = Some(token);
            write_settings(&settings)?;
            println!("✔ Auth token stored");
        }
    }

    Ok(())
}
