use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use reelgrab::api::ReelApi;
use reelgrab::cli::Args;
use reelgrab::models::ThumbnailPreview;
use reelgrab::session::{Session, Step};
use reelgrab::{logging, reel_url};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let output_dir = PathBuf::from(&args.output);
    if !output_dir.exists() {
        fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
    }

    let api = ReelApi::new(&args.api_base, args.timeout, args.proxy.as_deref())?;

    match &args.url {
        Some(url) => run_one_shot(&api, &args, &output_dir, url).await,
        None => run_wizard(&api, &args, &output_dir).await,
    }
}

/// Non-interactive path: resolve, show the preview, confirm (unless --yes),
/// download.
async fn run_one_shot(api: &ReelApi, args: &Args, output_dir: &Path, url: &str) -> Result<()> {
    if !reel_url::is_reel_url(url) {
        return Err(anyhow!("Not an Instagram reel URL: {url}"));
    }

    let response = api.fetch_thumbnail(url).await?;
    let preview = ThumbnailPreview::from_response(response, url)?;
    let preview_path = save_preview(&preview, output_dir)?;

    println!("Shortcode: {}", preview.shortcode);
    println!("Thumbnail: {}", preview.thumbnail_url);
    println!("Preview:   {}", preview_path.display());

    if !args.yes && !confirm("Download this reel? [y/N] ")? {
        println!("Cancelled.");
        let _ = fs::remove_file(&preview_path);
        return Ok(());
    }

    let saved = api.download_reel(&preview.shortcode, output_dir).await?;
    println!("Saved {}", saved.display());

    if !args.keep_thumbnail {
        let _ = fs::remove_file(&preview_path);
    }

    Ok(())
}

/// Interactive two-step wizard. Step 1 collects a URL and fetches the
/// thumbnail; step 2 reviews it and downloads or cancels. Every failure is
/// shown inline and leaves the user on the same step to retry.
async fn run_wizard(api: &ReelApi, args: &Args, output_dir: &Path) -> Result<()> {
    let mut session = Session::new();
    let mut preview_path: Option<PathBuf> = None;

    loop {
        if let Some(error) = session.take_error() {
            eprintln!("error: {error}");
        }

        match session.step() {
            Step::CollectUrl => {
                let Some(line) = prompt("Reel URL (q to quit): ")? else {
                    return Ok(());
                };
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("q") {
                    return Ok(());
                }

                session.set_url(line);
                if !session.can_fetch() {
                    session.fail("That does not look like an Instagram reel URL.");
                    continue;
                }

                session.begin_request();
                let outcome = api.fetch_thumbnail(session.url()).await;
                session.finish_request();

                let outcome = outcome
                    .and_then(|resp| ThumbnailPreview::from_response(resp, session.url()));
                match outcome {
                    Ok(preview) => {
                        let path = save_preview(&preview, output_dir)?;
                        println!("Shortcode: {}", preview.shortcode);
                        println!("Preview:   {}", path.display());
                        preview_path = Some(path);
                        session.apply_preview(preview);
                    }
                    Err(e) => session.fail(e.to_string()),
                }
            }
            Step::Review => {
                let Some(choice) = prompt("[d]ownload / [c]ancel / [q]uit: ")? else {
                    return Ok(());
                };
                match choice.to_ascii_lowercase().as_str() {
                    "d" | "download" => {
                        // Review step always holds a preview.
                        let shortcode = match session.shortcode() {
                            Some(code) => code.to_string(),
                            None => {
                                session.reset();
                                continue;
                            }
                        };

                        session.begin_request();
                        let outcome = api.download_reel(&shortcode, output_dir).await;
                        session.finish_request();

                        match outcome {
                            Ok(path) => {
                                println!("Saved {}", path.display());
                                discard_preview(&mut preview_path, args.keep_thumbnail);
                            }
                            Err(e) => session.fail(e.to_string()),
                        }
                    }
                    "c" | "cancel" => {
                        session.reset();
                        discard_preview(&mut preview_path, args.keep_thumbnail);
                    }
                    "q" | "quit" => return Ok(()),
                    other => session.fail(format!("Unknown choice: {other}")),
                }
            }
        }
    }
}

fn save_preview(preview: &ThumbnailPreview, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!(
        "{}_thumbnail.{}",
        preview.shortcode, preview.image_ext
    ));
    fs::write(&path, &preview.image_bytes).context("Failed to write thumbnail preview")?;
    Ok(path)
}

/// Drops the saved preview image unless the user asked to keep it.
fn discard_preview(preview_path: &mut Option<PathBuf>, keep: bool) {
    if let Some(path) = preview_path.take() {
        if !keep {
            let _ = fs::remove_file(path);
        }
    }
}

/// Prompts on stdout and reads one line. `None` means stdin is closed
/// (Ctrl-D or exhausted piped input) and the caller should quit.
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    read_line_trimmed(&mut io::stdin().lock())
}

fn read_line_trimmed(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirm(message: &str) -> Result<bool> {
    match prompt(message)? {
        Some(answer) => Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")),
        None => Ok(false),
    }
}
