use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    config::{Instance, ProbeConfig},
    error::ProbeError,
    fallback::{each, first_success},
    invidious::{
        api::{get_channel_streams, get_video},
        structs::{VideoDetails, VideoSummary},
        utils::ChannelId,
    },
};

/// Outcome of listing one channel's streams on one instance
#[derive(Debug, Clone, Serialize)]
pub struct StreamQueryResult {
    pub instance: Instance,
    pub url: String,
    pub success: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub total_videos: usize,
    pub live_count: usize,
    pub videos: Vec<VideoSummary>,
}

impl StreamQueryResult {
    fn new(instance: &Instance, url: String, outcome: Result<Vec<VideoSummary>, ProbeError>) -> Self {
        match outcome {
            Ok(videos) => Self {
                instance: instance.clone(),
                url,
                success: true,
                status_code: Some(StatusCode::OK.as_u16()),
                error: None,
                total_videos: videos.len(),
                live_count: videos.iter().filter(|v| v.is_live()).count(),
                videos,
            },
            Err(e) => Self {
                instance: instance.clone(),
                url,
                success: false,
                status_code: e.status().map(|s| s.as_u16()),
                error: Some(e.to_string()),
                total_videos: 0,
                live_count: 0,
                videos: Vec::new(),
            },
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &VideoSummary> {
        self.videos.iter().filter(|v| v.is_live())
    }

    pub fn recent(&self, now: DateTime<Utc>, window: TimeDelta) -> impl Iterator<Item = &VideoSummary> {
        self.videos.iter().filter(move |v| v.is_recent(now, window))
    }
}

/// Lists a channel's streams on a single instance
///
/// Never fails; errors end up in [`StreamQueryResult::error`].
#[instrument(skip(client))]
pub async fn inspect_streams(
    client: &Client,
    instance: &Instance,
    channel_id: &ChannelId,
) -> StreamQueryResult {
    let url = instance.api_url(&format!("channels/{channel_id}/streams"));
    let result = StreamQueryResult::new(
        instance,
        url,
        get_channel_streams(client, instance, channel_id).await,
    );

    match &result.error {
        None => info!(
            "{instance}: {} videos, {} live",
            result.total_videos, result.live_count
        ),
        Some(e) => warn!("{instance}: {e}"),
    }

    result
}

/// Queries every configured instance independently, one result per instance in configured order
pub async fn inspect_all(
    client: &Client,
    config: &ProbeConfig,
    channel_id: &ChannelId,
) -> Vec<StreamQueryResult> {
    each(config.strategy, &config.instances, |instance| {
        inspect_streams(client, instance, channel_id)
    })
    .await
}

/// First instance that lists the channel's streams successfully
pub async fn inspect_first(
    client: &Client,
    config: &ProbeConfig,
    channel_id: &ChannelId,
) -> Option<StreamQueryResult> {
    first_success(config.strategy, &config.instances, |instance| async move {
        let result = inspect_streams(client, instance, channel_id).await;
        if result.success {
            Ok(result)
        } else {
            Err(ProbeError::NotFound("streams listing"))
        }
    })
    .await
    .map(|(_, result)| result)
}

/// Successful result reporting the most live streams, earliest instance on ties
///
/// `None` if nobody reports a live stream.
#[must_use]
pub fn best_result(results: &[StreamQueryResult]) -> Option<&StreamQueryResult> {
    results
        .iter()
        .filter(|r| r.success && r.live_count > 0)
        .reduce(|best, r| if r.live_count > best.live_count { r } else { best })
}

/// Fetches a single video's live status from the first instance that knows it
pub async fn lookup_video(
    client: &Client,
    config: &ProbeConfig,
    video_id: &str,
) -> Option<(Instance, VideoDetails)> {
    first_success(config.strategy, &config.instances, |instance| {
        get_video(client, instance, video_id)
    })
    .await
    .map(|(instance, video)| (instance.clone(), video))
}
