//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command
//! handlers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, TranscribeOptions};

/// Send recorded audio to a Whisper relay or the OpenAI API and get text back
#[derive(Parser)]
#[command(name = "dicto")]
#[command(version)]
#[command(about = "Transcribe recorded audio through a self-hosted Whisper relay or the OpenAI API")]
#[command(
    long_about = "dicto sends a recorded audio file (or a data URI exported from a browser \
recorder) to a transcription backend and prints the transcript.\n\n\
Two backends are supported:\n  - relay: a self-hosted Whisper proxy (X-API-KEY auth)\n  \
- openai: the OpenAI Whisper API (bearer auth), with optional punctuation cleanup,\n    \
speaker tagging and summaries\n\nEXAMPLES:\n    \
# Transcribe through the relay and pipe the text\n    $ dicto transcribe meeting.m4a | wc -w\n\n    \
# Transcribe through OpenAI with speaker tagging\n    $ dicto transcribe -b openai --speakers \"Alice,Bob\" meeting.m4a\n\n    \
# Store credentials\n    $ dicto auth relay rk-... --default\n    $ dicto auth openai sk-...\n\n    \
# Check that the relay is up\n    $ dicto health"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/dicto/dicto.toml\n    Credentials:        ~/.local/share/dicto/credentials.toml\n    Logs:               ~/.local/state/dicto/dicto.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a recorded audio file or data URI
    ///
    /// Outputs to stdout by default for piping to other commands.
    #[command(visible_alias = "t")]
    Transcribe {
        /// Path to the audio file to transcribe
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Audio embedded as a base64 data URI instead of a file
        #[arg(long, value_name = "URI", conflicts_with = "file")]
        data_uri: Option<String>,

        /// Backend to use: "relay" or "openai"
        #[arg(short, long, value_name = "BACKEND")]
        backend: Option<String>,

        /// Relay model tier: "small" or "medium"
        #[arg(short, long, value_name = "TIER")]
        tier: Option<String>,

        /// Skip the punctuation cleanup pass (OpenAI backend)
        #[arg(long)]
        raw: bool,

        /// Append a short summary after the transcript (OpenAI backend)
        #[arg(long)]
        summary: bool,

        /// Comma-separated speaker names for gap-based tagging (OpenAI backend)
        #[arg(long, value_name = "NAMES")]
        speakers: Option<String>,

        /// Copy transcription to clipboard instead of stdout
        #[arg(short, long)]
        clipboard: bool,

        /// Write transcription to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,
    },

    /// Check that the configured relay endpoint is reachable
    Health,

    /// Store an API key for a backend
    ///
    /// Keys are kept with owner-only permissions in the local data directory,
    /// never in the main config file.
    #[command(visible_alias = "a")]
    Auth {
        /// Backend the key belongs to: "relay" or "openai"
        #[arg(value_name = "BACKEND")]
        backend: String,

        /// The API key to store
        #[arg(value_name = "KEY")]
        key: Option<String>,

        /// Make this backend the default for 'dicto transcribe'
        #[arg(long)]
        default: bool,

        /// Remove the stored key instead of saving one
        #[arg(long, conflicts_with = "key")]
        clear: bool,
    },

    /// Open the configuration file in your editor
    Config,
}

/// Parses the command line and runs the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transcribe {
            file,
            data_uri,
            backend,
            tier,
            raw,
            summary,
            speakers,
            clipboard,
            output,
        } => {
            commands::handle_transcribe(TranscribeOptions {
                file,
                data_uri,
                backend,
                tier,
                raw,
                summary,
                speakers,
                clipboard,
                output,
            })
            .await
        }
        Commands::Health => commands::handle_health().await,
        Commands::Auth {
            backend,
            key,
            default,
            clear,
        } => commands::handle_auth(backend, key, default, clear),
        Commands::Config => commands::handle_config(),
    }
}
