use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    config::Instance,
    error::ProbeError,
    invidious::{
        structs::{ChannelInfo, SearchResult, VideoDetails, VideoSummary, parse_video_list},
        utils::ChannelId,
    },
    util::truncate_string,
};

/// GETs an endpoint and returns the body of a `200 OK` response
///
/// Any other status becomes [`ProbeError::Http`].
/// A body that cannot be read keeps the `200` on its [`ProbeError::Decode`].
async fn get_body(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<String, ProbeError> {
    let res = client.get(url).query(query).send().await?;

    let status = res.status();
    if status != StatusCode::OK {
        let body = res.text().await.unwrap_or_default();
        debug!("{url} returned {status}: {}", truncate_string(&body, 200));
        return Err(ProbeError::Http { status });
    }

    res.text()
        .await
        .map_err(|e| ProbeError::from(e).with_status(status))
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProbeError> {
    let body = get_body(client, url, query).await?;
    serde_json::from_str(&body).map_err(|e| ProbeError::from(e).with_status(StatusCode::OK))
}

/// Runs `/search` with the given `type` (`channel`, `video`, ...) and optional `features` filter
///
/// # Errors
/// Errors on network error, non-200 response or when the response is not an array of results
#[instrument(skip(client))]
pub async fn search(
    client: &Client,
    instance: &Instance,
    query: &str,
    kind: &str,
    features: Option<&str>,
) -> Result<Vec<SearchResult>, ProbeError> {
    let mut params = vec![("q", query), ("type", kind)];
    if let Some(features) = features {
        params.push(("features", features));
    }

    get_json(client, &instance.api_url("search"), &params).await
}

/// Searches channels matching a handle
///
/// # Errors
/// See [`search`]
pub async fn search_channels(
    client: &Client,
    instance: &Instance,
    handle: &str,
) -> Result<Vec<SearchResult>, ProbeError> {
    search(client, instance, handle, "channel", None).await
}

/// Lists a channel's streams tab, current broadcasts included
///
/// # Errors
/// Errors on network error, non-200 response or when the listing has an unknown shape
#[instrument(skip(client))]
pub async fn get_channel_streams(
    client: &Client,
    instance: &Instance,
    channel_id: &ChannelId,
) -> Result<Vec<VideoSummary>, ProbeError> {
    let url = instance.api_url(&format!("channels/{channel_id}/streams"));
    let body = get_body(client, &url, &[]).await?;
    parse_video_list(&body).map_err(|e| e.with_status(StatusCode::OK))
}

/// Fetches a channel's description, subscriber count and latest uploads
///
/// # Errors
/// Errors on network error, non-200 response (404 for unknown channels) or malformed body
#[instrument(skip(client))]
pub async fn get_channel_info(
    client: &Client,
    instance: &Instance,
    channel_id: &ChannelId,
) -> Result<ChannelInfo, ProbeError> {
    let url = instance.api_url(&format!("channels/{channel_id}"));
    get_json(client, &url, &[]).await
}

/// # Errors
/// Errors on network error, non-200 response or malformed body
#[instrument(skip(client))]
pub async fn get_video(
    client: &Client,
    instance: &Instance,
    video_id: &str,
) -> Result<VideoDetails, ProbeError> {
    let url = instance.api_url(&format!("videos/{video_id}"));
    get_json(client, &url, &[]).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    use super::*;
    use crate::util::init_http_client;

    fn instance(server: &MockServer) -> Instance {
        server.uri().parse().unwrap()
    }

    fn channel_id() -> ChannelId {
        ChannelId::parse("UCJ0Y3WUgX0eqgQ76mz1PaFA").unwrap()
    }

    #[tokio::test]
    async fn search_sends_query_and_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/search"))
            .and(query_param("q", "soulcalibur 6"))
            .and(query_param("type", "video"))
            .and(query_param("features", "live"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "type": "video", "videoId": "abcdefghijk", "liveNow": true }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = init_http_client(Duration::from_secs(5)).unwrap();
        let results = search(&client, &instance(&server), "soulcalibur 6", "video", Some("live"))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].video.is_live());
    }

    #[tokio::test]
    async fn non_200_is_an_http_error() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/channels/UCJ0Y3WUgX0eqgQ76mz1PaFA/streams"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = init_http_client(Duration::from_secs(5)).unwrap();
        let err = get_channel_streams(&client, &instance(&server), &channel_id())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn html_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/channels/UCJ0Y3WUgX0eqgQ76mz1PaFA"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
            .mount(&server)
            .await;

        let client = init_http_client(Duration::from_secs(5)).unwrap();
        let err = get_channel_info(&client, &instance(&server), &channel_id())
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Decode { .. }), "{err:?}");
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn unparsable_listing_keeps_the_200_status() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/channels/UCJ0Y3WUgX0eqgQ76mz1PaFA/streams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "nope" })))
            .mount(&server)
            .await;

        let client = init_http_client(Duration::from_secs(5)).unwrap();
        let err = get_channel_streams(&client, &instance(&server), &channel_id())
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Decode { .. }), "{err:?}");
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn slow_instances_time_out() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/videos/abcdefghijk"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "liveNow": true }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = init_http_client(Duration::from_millis(200)).unwrap();
        let err = get_video(&client, &instance(&server), "abcdefghijk")
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Timeout), "{err:?}");
    }

    #[tokio::test]
    async fn refused_connections_are_network_errors() {
        let client = init_http_client(Duration::from_secs(2)).unwrap();
        let dead: Instance = "http://127.0.0.1:1".parse().unwrap();
        let err = get_video(&client, &dead, "abcdefghijk").await.unwrap_err();

        assert!(matches!(err, ProbeError::Network(_)), "{err:?}");
    }
}
