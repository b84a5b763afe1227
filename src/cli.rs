use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bolo")]
#[command(about = "Bolo - voice driven product listings", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Backend URL override for this run
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Enable debug mode with verbose logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a product description from photos and a voice note
    Generate {
        /// Image files to attach
        #[arg(short, long, required = true, num_args = 1..)]
        images: Vec<PathBuf>,

        /// Use this text instead of recording a voice note
        #[arg(short, long)]
        text: Option<String>,

        /// Transcribe this WAV file instead of recording live
        #[arg(long, conflicts_with = "text")]
        audio: Option<PathBuf>,

        /// Keep the recorded voice note at this path
        #[arg(long)]
        save_audio: Option<PathBuf>,

        /// Save the generated listing to the product database
        #[arg(long)]
        save: bool,

        /// Append the generated listing to the shared sheet
        #[arg(long)]
        sheet: bool,
    },

    /// Browse saved products and run actions on them
    Catalog {
        #[command(subcommand)]
        action: Option<CatalogAction>,
    },

    /// Talk to the help assistant
    Chat {
        /// Read bot replies aloud
        #[arg(long)]
        voice: bool,
    },

    /// List available microphones
    Devices,

    /// Show or update stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// Print every saved product
    List,

    /// Publish one product to the store
    Publish {
        /// Product position from `catalog list`
        index: usize,
    },

    /// Ask for a price suggestion for one product
    Predict {
        /// Product position from `catalog list`
        index: usize,
    },

    /// Start an advertisement run for one product
    Advertise {
        /// Product position from `catalog list`
        index: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the stored settings
    Show,

    /// Set the backend URL
    SetBackend { url: String },

    /// Set the preferred microphone by name
    SetMicrophone { name: String },

    /// Set the default speech synthesis language tag
    SetLanguage { lang: String },

    /// Store the auth token used for chat identity
    SetToken { token: String },
}
