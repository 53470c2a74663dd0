//! Commands that inspect one stage of the pipeline without running a cycle.

use std::path::Path;
use std::sync::Arc;

use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use tokio::runtime::Runtime;

use super::poll::build_search;
use crate::config::Config;
use crate::media::{FfmpegTool, detector, is_static_placeholder};
use crate::model::Track;
use crate::sync::FileWatermarkStore;
use crate::traits::{VideoSearch, WatermarkStore};
use crate::video::{YtDlp, pick_candidate};

/// Show the search hits for a track and which one the ranking picks
pub fn cmd_resolve(rt: &Runtime, config: &Config, artist: &str, title: &str) -> anyhow::Result<()> {
    let ytdlp = Arc::new(YtDlp::new(
        &config.video.ytdlp_path,
        config.poll.command_timeout(),
    ));
    let search = build_search(config, ytdlp)?;
    let track = Track::new(artist, title, "", 0);
    let query = track.search_query();

    let candidates = rt.block_on(search.search(&query, config.video.search_results))?;

    println!("Query: {}", query);
    for (i, candidate) in candidates.iter().enumerate() {
        println!("  {:>2}. {} <{}>", i + 1, candidate.title, candidate.url);
    }
    println!();

    match pick_candidate(candidates) {
        Some(picked) => {
            println!("Selected: {}", picked.title);
            println!("URL:      {}", picked.url);
            if let Some(thumb) = picked.thumbnail_url {
                println!("Cover:    {}", thumb);
            }
            println!(
                "Saves as: {}",
                track.canonical_file_name(config.video.container().extension())
            );
        }
        None => println!("No candidate found"),
    }
    Ok(())
}

/// Run the placeholder detector on a file and print its embedded tags
pub fn cmd_check(rt: &Runtime, config: &Config, file: &Path) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("{:?} is not a file", file);
    }

    let ffmpeg = FfmpegTool::new(
        &config.video.ffmpeg_path,
        config.poll.command_timeout(),
        config.video.container(),
    );
    let is_static = rt.block_on(is_static_placeholder(&ffmpeg, file));

    println!("File: {}", file.display());
    if is_static {
        println!(
            "✗ Static placeholder: the first {} sampled frames are identical",
            detector::SAMPLE_COUNT
        );
    } else {
        println!("✓ Moving video");
    }

    print_tags(file);

    if is_static {
        anyhow::bail!("{:?} looks like a static placeholder", file);
    }
    Ok(())
}

fn print_tags(file: &Path) {
    let tagged = match Probe::open(file).and_then(|p| p.read()) {
        Ok(tagged) => tagged,
        Err(e) => {
            println!("Tags: unreadable ({})", e);
            return;
        }
    };

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        println!("Tags: none");
        return;
    };

    println!("Title:  {}", tag.title().as_deref().unwrap_or("-"));
    println!("Artist: {}", tag.artist().as_deref().unwrap_or("-"));
    println!("Album:  {}", tag.album().as_deref().unwrap_or("-"));
    println!("Genre:  {}", tag.genre().as_deref().unwrap_or("-"));
    println!("Cover:  {}", if tag.pictures().is_empty() { "no" } else { "yes" });
}

/// Print the persisted watermark and resolved directories
pub fn cmd_status(config: &Config) -> anyhow::Result<()> {
    let store = FileWatermarkStore::new(&config.paths.app_data_dir);

    println!("Watermark file: {}", store.path().display());
    match store.load() {
        Ok(Some(wm)) => println!("Watermark:      {}", wm),
        Ok(None) => println!("Watermark:      (none, next cycle fetches recent history)"),
        Err(e) => println!("Watermark:      error: {}", e),
    }

    println!("Download dir:   {}", config.paths.download_dir.display());
    println!("Output dir:     {}", config.paths.output_dir().display());
    println!(
        "Log files:      {}",
        config
            .paths
            .app_data_dir
            .join(&config.logging.file_name)
            .display()
    );
    println!("Container:      {}", config.video.container().extension());
    println!(
        "Search backend: {}",
        if config.video.use_data_api {
            "YouTube Data API"
        } else {
            "yt-dlp"
        }
    );
    Ok(())
}
