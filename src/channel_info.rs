use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::{
    config::{Instance, ProbeConfig},
    fallback::first_success,
    invidious::{api::get_channel_info, structs::ChannelInfo, utils::ChannelId},
};

/// Checks that a channel exists, using the first instance that returns its info
///
/// `latestVideos` is not kept fresh by Invidious, so the result is only an existence check and
/// should not be used to decide whether the channel is live.
///
/// Returns `None` when every instance failed, 404s included.
#[instrument(skip(client, config))]
pub async fn lookup_channel(
    client: &Client,
    config: &ProbeConfig,
    channel_id: &ChannelId,
) -> Option<(Instance, ChannelInfo)> {
    let found = first_success(config.strategy, &config.instances, |instance| {
        get_channel_info(client, instance, channel_id)
    })
    .await;

    match found {
        Some((instance, info)) => {
            info!(
                "Channel found via {instance}: {}",
                info.author.as_deref().unwrap_or("unknown name")
            );
            Some((instance.clone(), info))
        }
        None => {
            warn!("Channel {channel_id} not found on any instance");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::path};

    use super::*;
    use crate::{config::Strategy, util::init_http_client};

    const INFO_PATH: &str = "/api/v1/channels/UCJ0Y3WUgX0eqgQ76mz1PaFA";

    fn channel_id() -> ChannelId {
        ChannelId::parse("UCJ0Y3WUgX0eqgQ76mz1PaFA").unwrap()
    }

    #[tokio::test]
    async fn all_404_is_not_found() {
        for strategy in [Strategy::Ordered, Strategy::Race] {
            let mut servers = Vec::new();
            for _ in 0..3 {
                let server = MockServer::start().await;
                Mock::given(path(INFO_PATH))
                    .respond_with(ResponseTemplate::new(404))
                    .expect(1)
                    .mount(&server)
                    .await;
                servers.push(server);
            }

            let urls: Vec<String> = servers.iter().map(MockServer::uri).collect();
            let config = ProbeConfig::new(&urls, 5, strategy, String::new()).unwrap();
            let client = init_http_client(Duration::from_secs(5)).unwrap();

            assert!(lookup_channel(&client, &config, &channel_id()).await.is_none());
        }
    }

    #[tokio::test]
    async fn first_answering_instance_wins() {
        let missing = MockServer::start().await;
        let found = MockServer::start().await;
        Mock::given(path(INFO_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&missing)
            .await;
        Mock::given(path(INFO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "author": "SOULCALIBUR VI - Topic",
                "authorId": "UCJ0Y3WUgX0eqgQ76mz1PaFA",
                "subCount": 12000,
                "description": "SoulCalibur VI game channel",
                "latestVideos": [
                    { "videoId": "abcdefghijk", "title": "Grand finals", "liveNow": false, "publishedText": "1 day ago" }
                ]
            })))
            .mount(&found)
            .await;

        let config =
            ProbeConfig::new(&[missing.uri(), found.uri()], 5, Strategy::Ordered, String::new()).unwrap();
        let client = init_http_client(Duration::from_secs(5)).unwrap();

        let (instance, info) = lookup_channel(&client, &config, &channel_id()).await.unwrap();
        assert_eq!(instance.as_str(), found.uri());
        assert_eq!(info.sub_count, Some(12000));
        assert_eq!(info.latest_videos.len(), 1);
        assert_eq!(info.latest_videos[0].published_text.as_deref(), Some("1 day ago"));
    }
}
