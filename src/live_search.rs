use std::cmp::Reverse;

use reqwest::Client;
use tracing::{info, instrument};

use crate::{
    config::{Instance, ProbeConfig},
    fallback::first_success,
    invidious::{api::search, structs::SearchResult, structs::VideoSummary},
};

fn is_live(result: &SearchResult) -> bool {
    result.video.is_live() || result.kind == "live"
}

/// Searches videos that are being broadcast right now, most watched first
///
/// The first instance that answers the search is used, even if it found nothing live.
/// Returns `None` when no instance answered.
#[instrument(skip(client, config))]
pub async fn search_live(
    client: &Client,
    config: &ProbeConfig,
    query: &str,
) -> Option<(Instance, Vec<VideoSummary>)> {
    let (instance, results) = first_success(config.strategy, &config.instances, |instance| {
        search(client, instance, query, "video", Some("live"))
    })
    .await?;

    let mut live: Vec<VideoSummary> = results
        .into_iter()
        .filter(is_live)
        .map(|r| r.video)
        .collect();
    live.sort_by_key(|v| Reverse(v.viewers()));

    info!("Found {} live videos via {instance}", live.len());
    Some((instance.clone(), live))
}
