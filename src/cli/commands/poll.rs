//! Poll loop commands and service wiring.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::lastfm::LastFmClient;
use crate::media::{FfmpegTool, Pipeline, ThumbnailClient};
use crate::sync::{FileWatermarkStore, Poller};
use crate::traits::VideoSearch;
use crate::video::{YouTubeApiClient, YtDlp};

/// Run the unattended poll loop until Ctrl-C
pub fn cmd_run(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    config.validate().map_err(Error::from)?;

    rt.block_on(async {
        log_startup(config);
        warn_missing_tools(config).await;

        let poller = build_poller(config)?;
        let watermark = poller.load_watermark();
        poller
            .run_loop(watermark, config.poll.interval(), shutdown_signal())
            .await;
        Ok::<_, anyhow::Error>(())
    })
}

/// Run exactly one poll cycle
pub fn cmd_once(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    config.validate().map_err(Error::from)?;

    rt.block_on(async {
        log_startup(config);
        let poller = build_poller(config)?;
        let watermark = poller.load_watermark();

        let report = poller.run_cycle(watermark).await?;
        println!("Fetched:         {}", report.fetched);
        println!("Downloaded:      {}", report.downloaded);
        println!("Already present: {}", report.already_present);
        println!("Failed:          {}", report.failed);
        match report.watermark {
            Some(wm) => println!("Watermark:       {}", wm),
            None => println!("Watermark:       (none)"),
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Wire the real clients into a [`Poller`].
pub(crate) fn build_poller(config: &Config) -> anyhow::Result<Poller> {
    let lastfm = Arc::new(LastFmClient::new(&config.lastfm, config.poll.http_timeout())?);
    let ytdlp = Arc::new(YtDlp::new(
        &config.video.ytdlp_path,
        config.poll.command_timeout(),
    ));
    let container = config.video.container();

    let ffmpeg = Arc::new(FfmpegTool::new(
        &config.video.ffmpeg_path,
        config.poll.command_timeout(),
        container,
    ));

    let mut pipeline = Pipeline::new(
        ytdlp.clone(),
        ffmpeg,
        &config.paths.download_dir,
        config.paths.output_dir(),
        container,
    );
    if config.video.embed_thumbnail {
        pipeline =
            pipeline.with_thumbnails(Arc::new(ThumbnailClient::new(config.poll.http_timeout())?));
    }

    let store = Arc::new(FileWatermarkStore::new(&config.paths.app_data_dir));

    Ok(Poller::new(
        lastfm.clone(),
        lastfm,
        build_search(config, ytdlp)?,
        pipeline,
        store,
    )
    .with_search_results(config.video.search_results))
}

/// The configured search backend.
pub(crate) fn build_search(
    config: &Config,
    ytdlp: Arc<YtDlp>,
) -> anyhow::Result<Arc<dyn VideoSearch>> {
    if !config.video.use_data_api {
        return Ok(ytdlp);
    }

    let key = config
        .video
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("YOUTUBE_USE_DATA_API is set but YOUTUBE_API_KEY is not"))?;
    Ok(Arc::new(YouTubeApiClient::new(
        key,
        config.poll.http_timeout(),
    )?))
}

fn log_startup(config: &Config) {
    info!(
        "fmtv {} polling as {:?} every {}s",
        env!("CARGO_PKG_VERSION"),
        config.lastfm.username.as_deref().unwrap_or_default(),
        config.poll.interval_secs
    );
    info!(
        "Downloads in {:?}, output in {:?}, state in {:?}",
        config.paths.download_dir,
        config.paths.output_dir(),
        config.paths.app_data_dir
    );
}

/// Missing tools fail every track, but the loop keeps running so a later
/// install is picked up without a restart.
async fn warn_missing_tools(config: &Config) {
    let ytdlp = YtDlp::new(&config.video.ytdlp_path, config.poll.command_timeout());
    if ytdlp.version().await.is_none() {
        warn!("yt-dlp not runnable at {:?}", config.video.ytdlp_path);
    }

    let ffmpeg = FfmpegTool::new(
        &config.video.ffmpeg_path,
        config.poll.command_timeout(),
        config.video.container(),
    );
    if ffmpeg.version().await.is_none() {
        warn!("ffmpeg not runnable at {:?}", config.video.ffmpeg_path);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
