use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProbeError;

/// A video entry as listed by `/channels/{id}/streams`, `/channels/{id}` and `/search`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub view_count: Option<u64>,
    /// Concurrent viewers, reported for some live search results instead of `viewCount`
    #[serde(default, deserialize_with = "lenient_u64")]
    pub live_viewers: Option<u64>,
    /// Unix timestamp in seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    pub published: Option<i64>,
    #[serde(default)]
    pub published_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub length_seconds: Option<u64>,
    #[serde(default, deserialize_with = "strictly_true")]
    pub live_now: bool,
    #[serde(default, deserialize_with = "strictly_true")]
    pub is_upcoming: bool,
}

impl VideoSummary {
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live_now
    }

    /// Whether the video was published within `window` before `now`
    ///
    /// Videos without a timestamp, or with one in the future (scheduled premieres), are never recent.
    #[must_use]
    pub fn is_recent(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        let Some(published) = self.published else {
            return false;
        };
        now.timestamp()
            .checked_sub(published)
            .is_some_and(|age| age >= 0 && age <= window.num_seconds())
    }

    /// `viewCount`, or `liveViewers` when the former is missing or zero
    #[must_use]
    pub fn viewers(&self) -> u64 {
        self.view_count
            .filter(|&n| n > 0)
            .or(self.live_viewers)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn watch_url(&self) -> String {
        format!(
            "https://youtube.com/watch?v={}",
            self.video_id.as_deref().unwrap_or_default()
        )
    }
}

/// One record of `/search`. Only `channel` typed records carry `subCount`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sub_count: Option<u64>,
    #[serde(flatten)]
    pub video: VideoSummary,
}

impl SearchResult {
    #[must_use]
    pub fn is_channel(&self) -> bool {
        self.kind == "channel"
    }

    #[must_use]
    pub fn author_id(&self) -> Option<&str> {
        self.video.author_id.as_deref()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.video.author.as_deref()
    }
}

/// Response of `/channels/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sub_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latest_videos: Vec<VideoSummary>,
}

/// Response of `/videos/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(flatten)]
    pub summary: VideoSummary,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// Only present while the video is being broadcast
    #[serde(default)]
    pub hls_url: Option<String>,
}

/// Parses a streams listing into a flat list of videos
///
/// Instances answer either with a bare array or with `{"videos": [...]}` depending on their version.
///
/// # Errors
/// Errors when the body is not JSON or is neither of those shapes
pub fn parse_video_list(body: &str) -> Result<Vec<VideoSummary>, ProbeError> {
    let json: Value = serde_json::from_str(body)?;

    let videos = match json {
        videos @ Value::Array(_) => videos,
        Value::Object(mut map) => match map.remove("videos") {
            Some(videos @ Value::Array(_)) => videos,
            _ => {
                return Err(ProbeError::decode(
                    "object response without a `videos` array",
                ));
            }
        },
        other => {
            return Err(ProbeError::decode(format!(
                "expected an array of videos, got `{other}`"
            )));
        }
    };

    Ok(serde_json::from_value(videos)?)
}

/// `true` only for a JSON boolean `true`; strings, numbers and `null` all read as `false`
fn strictly_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_u64())
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_i64())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wrapped_listing_is_unwrapped() {
        let body = json!({
            "videos": [{ "videoId": "abc", "title": "SC6 ranked", "liveNow": true }],
            "continuation": "xyz"
        })
        .to_string();

        let videos = parse_video_list(&body).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos.iter().filter(|v| v.is_live()).count(), 1);
        assert_eq!(videos[0].video_id.as_deref(), Some("abc"));
    }

    #[test]
    fn bare_listing_without_live_entries() {
        let body = json!([
            { "videoId": "a", "liveNow": false },
            { "videoId": "b" },
            { "videoId": "c", "liveNow": null },
        ])
        .to_string();

        let videos = parse_video_list(&body).unwrap();
        assert_eq!(videos.len(), 3);
        assert_eq!(videos.iter().filter(|v| v.is_live()).count(), 0);
    }

    #[test]
    fn only_boolean_true_is_live() {
        let body = json!([
            { "liveNow": "true" },
            { "liveNow": 1 },
            { "liveNow": true },
        ])
        .to_string();

        let live: Vec<bool> = parse_video_list(&body)
            .unwrap()
            .iter()
            .map(VideoSummary::is_live)
            .collect();
        assert_eq!(live, [false, false, true]);
    }

    #[test]
    fn unexpected_shapes_are_decode_errors() {
        for body in [r#"{"error": "nope"}"#, r#""hello""#, "<html></html>", r#"{"videos": 3}"#] {
            assert!(
                matches!(parse_video_list(body), Err(ProbeError::Decode { .. })),
                "{body} should not parse"
            );
        }
    }

    #[test]
    fn odd_numeric_fields_do_not_fail_the_listing() {
        let body = json!([{ "videoId": "a", "viewCount": "12K", "published": null }]).to_string();
        let videos = parse_video_list(&body).unwrap();
        assert_eq!(videos[0].view_count, None);
        assert_eq!(videos[0].published, None);
    }

    #[test]
    fn recency_uses_the_published_timestamp() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let window = TimeDelta::minutes(60);
        let at = |published| VideoSummary {
            published,
            ..Default::default()
        };

        assert!(at(Some(1_700_000_000 - 59 * 60)).is_recent(now, window));
        assert!(!at(Some(1_700_000_000 - 61 * 60)).is_recent(now, window));
        assert!(!at(Some(1_700_000_000 + 600)).is_recent(now, window));
        assert!(!at(None).is_recent(now, window));
    }

    #[test]
    fn extreme_timestamps_are_not_recent() {
        let now = Utc::now();
        let window = TimeDelta::minutes(60);

        let body = json!([
            { "videoId": "a", "published": i64::MIN },
            { "videoId": "b", "published": i64::MAX },
        ])
        .to_string();
        let videos = parse_video_list(&body).unwrap();

        assert_eq!(videos[0].published, Some(i64::MIN));
        assert_eq!(videos[1].published, Some(i64::MAX));
        assert!(videos.iter().all(|v| !v.is_recent(now, window)));
    }

    #[test]
    fn search_results_keep_channel_fields() {
        let results: Vec<SearchResult> = serde_json::from_value(json!([
            { "type": "video", "videoId": "v", "author": "Someone", "authorId": "UC0000000000000000000000" },
            { "type": "channel", "author": "JingleBells", "authorId": "UC2eOo8z3dhPbBkyqHbnxm6A", "subCount": 1234 },
        ]))
        .unwrap();

        assert!(!results[0].is_channel());
        assert!(results[1].is_channel());
        assert_eq!(results[1].author_id(), Some("UC2eOo8z3dhPbBkyqHbnxm6A"));
        assert_eq!(results[1].sub_count, Some(1234));
    }
}
