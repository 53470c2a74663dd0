//! External tool discovery.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::media::FfmpegTool;
use crate::video::YtDlp;

/// Check that yt-dlp and ffmpeg run, and which credentials are set
pub fn cmd_check_tools(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    println!("Checking external tools...\n");

    let (ytdlp, ffmpeg) = rt.block_on(async {
        let ytdlp = YtDlp::new(&config.video.ytdlp_path, config.poll.command_timeout());
        let ffmpeg = FfmpegTool::new(
            &config.video.ffmpeg_path,
            config.poll.command_timeout(),
            config.video.container(),
        );
        (ytdlp.version().await, ffmpeg.version().await)
    });

    let mut missing = false;
    for (name, path, version) in [
        ("yt-dlp", &config.video.ytdlp_path, ytdlp),
        ("ffmpeg", &config.video.ffmpeg_path, ffmpeg),
    ] {
        match version {
            Some(v) => println!("✓ {}: {}", name, v),
            None => {
                println!("✗ {}: NOT FOUND ({})", name, path.display());
                missing = true;
            }
        }
    }

    println!();
    println!("Credentials:");
    print_key("LASTFM_API_KEY", config.lastfm.api_key.is_some());
    print_key("LASTFM_USERNAME", config.lastfm.username.is_some());
    if config.video.use_data_api {
        print_key("YOUTUBE_API_KEY", config.video.api_key.is_some());
    }

    if missing {
        anyhow::bail!("required tools are missing");
    }
    Ok(())
}

fn print_key(name: &str, set: bool) {
    if set {
        println!("✓ {}: set", name);
    } else {
        println!("✗ {}: not set", name);
    }
}
