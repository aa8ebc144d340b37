//! Catalog and guide loading for one set of credentials.
//!
//! A load is a single task: categories, live streams, then a deferred guide
//! ingestion. Starting a new load cancels the previous one as a group, and a
//! cancelled load sends nothing further.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{Category, Stream, XtreamClient};
use crate::channel::{build_channel_list, Channel};
use crate::config::AppConfig;
use crate::epg::fetch_and_ingest;
use crate::errors::{GuideError, LoadingProgress, LoadingStage, Result};
use crate::time_codec::now_adjusted;

#[derive(Debug, Clone)]
pub enum LoadEvent {
    Progress(LoadingProgress),
    LiveCategories(Vec<Category>),
    VodCategories(Vec<Category>),
    SeriesCategories(Vec<Category>),
    /// Channel list before any guide data (`guide_loaded = false`)
    ChannelsLoaded(Vec<Channel>),
    VodMovies(Vec<Stream>),
    Series(Vec<serde_json::Value>),
    /// Same channel list with programmes merged in
    GuideLoaded(Vec<Channel>),
    Failed(String),
}

/// Sends events only while the load is still current
#[derive(Clone)]
struct Sink {
    tx: mpsc::Sender<LoadEvent>,
    token: CancellationToken,
}

impl Sink {
    async fn send(&self, event: LoadEvent) -> Result<()> {
        // A send parked on a full channel must not complete after cancellation
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(GuideError::Cancelled),
            // A dropped receiver means nobody is listening any more
            sent = self.tx.send(event) => sent.map_err(|_| GuideError::Cancelled),
        }
    }

    async fn progress(&self, stage: LoadingStage) -> Result<()> {
        self.send(LoadEvent::Progress(LoadingProgress::new(stage))).await
    }
}

#[derive(Debug, Default)]
pub struct CatalogLoader {
    current: Option<CancellationToken>,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the running load, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            debug!("cancelling previous catalog load");
            token.cancel();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Start loading the catalog, cancelling any earlier load
    pub fn load(&mut self, client: XtreamClient, config: &AppConfig, tx: mpsc::Sender<LoadEvent>) -> JoinHandle<()> {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let sink = Sink { tx, token: token.clone() };
        let config = config.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => Err(GuideError::Cancelled),
                r = run_load(client, config, sink.clone()) => r,
            };
            match outcome {
                Ok(()) => {}
                Err(e) if e.is_silent() => debug!("catalog load cancelled"),
                Err(e) => {
                    warn!(error = %e, "catalog load failed");
                    let _ = sink.progress(LoadingStage::ConnectionFailed).await;
                    let _ = sink.send(LoadEvent::Failed(e.to_string())).await;
                }
            }
        })
    }
}

async fn run_load(client: XtreamClient, config: AppConfig, sink: Sink) -> Result<()> {
    sink.progress(LoadingStage::Authenticating).await?;
    let live_cats = client.get_live_categories().await?;
    sink.send(LoadEvent::LiveCategories(live_cats.clone())).await?;

    // Secondary categories are cosmetic; a failure leaves them empty
    match client.get_vod_categories().await {
        Ok(cats) => sink.send(LoadEvent::VodCategories(cats)).await?,
        Err(e) => debug!(error = %e, "vod categories unavailable"),
    }
    match client.get_series_categories().await {
        Ok(cats) => sink.send(LoadEvent::SeriesCategories(cats)).await?,
        Err(e) => debug!(error = %e, "series categories unavailable"),
    }

    sink.progress(LoadingStage::DownloadingChannels).await?;
    let streams = client.get_live_streams().await?;

    // VOD listings are best-effort and never block the live grid
    let vod_client = client.clone();
    let vod_sink = sink.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = vod_sink.token.cancelled() => debug!("vod listings cancelled"),
            (movies, series) = async { futures::join!(vod_client.get_vod_streams(), vod_client.get_series()) } => {
                if let Ok(movies) = movies {
                    let _ = vod_sink.send(LoadEvent::VodMovies(movies)).await;
                }
                if let Ok(series) = series {
                    let _ = vod_sink.send(LoadEvent::Series(series)).await;
                }
            }
        }
    });

    if streams.is_empty() {
        sink.progress(LoadingStage::NoChannels).await?;
        sink.send(LoadEvent::Failed(LoadingStage::NoChannels.display_name().to_string())).await?;
        return Ok(());
    }

    sink.progress(LoadingStage::Processing).await?;
    let channels = build_channel_list(&streams, &live_cats, &client);
    info!(channels = channels.len(), "channel list ready");
    sink.send(LoadEvent::ChannelsLoaded(channels.clone())).await?;
    sink.progress(LoadingStage::Ready).await?;

    load_guide(&client, &config, channels, &sink).await;
    Ok(())
}

/// Deferred guide ingestion. Failures are logged and swallowed: channels
/// stay usable without a guide.
async fn load_guide(client: &XtreamClient, config: &AppConfig, channels: Vec<Channel>, sink: &Sink) {
    tokio::time::sleep(Duration::from_millis(config.guide.settle_delay_ms)).await;

    let window = config.guide_window(now_adjusted(config.time_zone));
    match fetch_and_ingest(client, channels, window, &sink.token).await {
        Ok(updated) => {
            let _ = sink.send(LoadEvent::GuideLoaded(updated)).await;
        }
        Err(GuideError::Cancelled) => debug!("guide ingestion cancelled"),
        Err(e) => warn!(error = %e, "guide fetch failed, continuing without guide"),
    }
}
