//! dicto: transcribe recorded audio through a self-hosted Whisper relay or
//! the OpenAI API.

mod app;
mod audio;
mod clipboard;
mod commands;
mod config;
mod logging;
mod postprocess;
mod transcription;

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
