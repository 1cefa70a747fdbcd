use std::io::{self, BufRead, Write};
use std::{env, error::Error};

use dream_song::config::Credentials;
use dream_song::pipeline::{Outcome, Pipeline};
use dream_song::song::SongResult;

use log::{error, info};

const SHEET_PROMPT: &str = "Paste your public Google Sheet URL (must have a 'dream' column):";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize the logger, RUST_LOG still wins
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter(None, log::LevelFilter::Info);
    if let Ok(filters) = env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    // Secrets are read once, before anything is asked of the user
    let credentials = Credentials::from_env()?;
    let pipeline = Pipeline::from_credentials(&credentials)?;

    println!("🎵 Dream-to-Song Composer");
    println!("Turn a collection of dreams into a song using GPT and Suno!");
    println!();

    // Take the sheet from the command line, or ask for it
    let sheet_url = match get_arg(1) {
        Ok(url) => url,
        Err(_) => prompt_for_sheet_url()?,
    };
    if sheet_url.trim().is_empty() {
        return Ok(());
    }

    info!("Fetching dreams and composing your song...");
    match pipeline.run(&sheet_url).await {
        Ok(outcome) => show(&outcome, &mut io::stdout())?,
        Err(e) => {
            error!("{e}");
            println!("Error: {e}");
        }
    }

    Ok(())
}

/// Write what the pipeline produced
fn show(outcome: &Outcome, out: &mut impl Write) -> io::Result<()> {
    match outcome {
        Outcome::NoDreams => writeln!(out, "⚠️  No dreams found in the sheet.")?,
        Outcome::Composed { lyrics, song, .. } => {
            writeln!(out, "🎤 Lyrics")?;
            writeln!(out)?;
            writeln!(out, "{lyrics}")?;
            writeln!(out)?;

            writeln!(out, "🎧 Your Song")?;
            match song {
                SongResult::Url(url) => {
                    writeln!(out, "[Click to listen to your AI-generated song]({url})")?
                }
                SongResult::Failed { .. } => writeln!(out, "{song}")?,
            }
        }
    }
    Ok(())
}

/// Get the nth command line argument
fn get_arg(index: usize) -> Result<String, Box<dyn Error>> {
    env::args()
        .nth(index)
        .ok_or_else(|| From::from(format!("less than {index} arguments provided")))
}

/// Ask for the sheet on stdin
fn prompt_for_sheet_url() -> Result<String, Box<dyn Error>> {
    print!("{SHEET_PROMPT} ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
