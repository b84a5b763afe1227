pub mod api;
pub mod audio_toolkit;
pub mod catalog;
pub mod chat;
pub mod cli;
mod commands;
pub mod describe;
pub mod dialog;
pub mod error;
pub mod managers;
pub mod settings;

pub use error::{Error, Result};

use cli::{CliArgs, Command};
use commands::generate::GenerateOpts;

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut settings = settings::get_settings();
    if let Some(url) = &args.backend_url {
        settings.backend_url = url.clone();
    }

    match args.command {
        Command::Generate {
            images,
            text,
            audio,
            save_audio,
            save,
            sheet,
        } => {
            let opts = GenerateOpts {
                images,
                text,
                audio,
                save_audio,
                save,
                sheet,
            };
            commands::generate::run(&settings, opts).await
        }
        Command::Catalog { action } => commands::catalog::run(&settings, action).await,
        Command::Chat { voice } => commands::chat::run(&settings, voice).await,
        Command::Devices => commands::devices::run(),
        Command::Config { action } => commands::config::run(action),
    }
}
