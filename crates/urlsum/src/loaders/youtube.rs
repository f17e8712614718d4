//! YouTube loader
//!
//! Handles URLs mentioning youtube.com, returning the video transcript
//! together with video info (title, author, views, length, ...).

use crate::error::SummarizeError;
use crate::loaders::{LoadOptions, Loader};
use crate::types::Document;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Default site root
const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Substring that routes a URL to this loader
const YOUTUBE_DOMAIN: &str = "youtube.com";

/// Marker preceding the player JSON embedded in the watch page
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

/// Hosts that carry video ids
const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "www.youtube-nocookie.com",
    "youtu.be",
];

/// YouTube transcript loader
///
/// Fetches the watch page, reads video info from the embedded player
/// response and downloads the best caption track for the configured
/// languages. Produces exactly one document.
pub struct YoutubeLoader {
    base_url: String,
}

impl YoutubeLoader {
    /// Create a loader talking to youtube.com
    pub fn new() -> Self {
        Self::with_base_url(YOUTUBE_BASE_URL)
    }

    /// Create a loader talking to a different site root
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn watch_url(&self, video_id: &str) -> Result<Url, SummarizeError> {
        let mut url = Url::parse(&format!("{}/watch", self.base_url))
            .map_err(|e| SummarizeError::LoaderError(format!("Invalid base URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("v", video_id)
            .append_pair("hl", "en");
        Ok(url)
    }

    fn build_client(options: &LoadOptions) -> Result<reqwest::Client, SummarizeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&options.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        // Skip the EU consent interstitial
        headers.insert(COOKIE, HeaderValue::from_static("CONSENT=YES+cb"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(SummarizeError::ClientBuildError)
    }

    async fn fetch_text(client: &reqwest::Client, url: &Url) -> Result<String, SummarizeError> {
        let response = client
            .get(url.as_str())
            .send()
            .await
            .map_err(SummarizeError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(SummarizeError::from_reqwest)
    }
}

impl Default for YoutubeLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the video id from a YouTube URL
///
/// Understands `/watch?v=ID`, `/embed/ID`, `/v/ID`, `/shorts/ID`,
/// `/live/ID` and `youtu.be/ID`.
pub fn extract_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    if !VIDEO_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host == "youtu.be" {
        segments.first().map(|s| s.to_string())
    } else {
        match segments.as_slice() {
            ["watch", ..] => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.trim().to_string()),
            ["embed" | "v" | "shorts" | "live", id, ..] => Some(id.to_string()),
            _ => None,
        }
    }?;

    let valid = !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(candidate)
}

/// Player response embedded in the watch page (partial)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    captions: Option<Captions>,
    microformat: Option<Microformat>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    title: Option<String>,
    length_seconds: Option<String>,
    short_description: Option<String>,
    author: Option<String>,
    view_count: Option<String>,
    thumbnail: Option<ThumbnailList>,
}

#[derive(Debug, Default, Deserialize)]
struct ThumbnailList {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
    width: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Microformat {
    player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicroformatRenderer {
    publish_date: Option<String>,
}

/// Timed text in `json3` format
#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

#[async_trait]
impl Loader for YoutubeLoader {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn matches(&self, url: &Url) -> bool {
        url.as_str().contains(YOUTUBE_DOMAIN)
    }

    async fn load(
        &self,
        url: &Url,
        options: &LoadOptions,
    ) -> Result<Vec<Document>, SummarizeError> {
        let video_id = extract_video_id(url).ok_or(SummarizeError::VideoIdNotFound)?;
        let client = Self::build_client(options)?;

        let watch_url = self.watch_url(&video_id)?;
        let page = Self::fetch_text(&client, &watch_url).await?;
        let player = parse_player_response(&page)?;

        let tracks = player
            .captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|r| r.caption_tracks.as_slice())
            .unwrap_or_default();

        if tracks.is_empty() {
            if let Some(reason) = unplayable_reason(&player) {
                return Err(SummarizeError::LoaderError(format!(
                    "Video {} is unavailable: {}",
                    video_id, reason
                )));
            }
        }

        let track = select_caption_track(tracks, &options.languages)
            .ok_or_else(|| SummarizeError::TranscriptUnavailable(video_id.clone()))?;
        debug!(
            video_id = %video_id,
            language = %track.language_code,
            generated = track.is_generated(),
            "Selected caption track"
        );

        let track_url = json3_url(&track.base_url, &watch_url)?;
        let raw = Self::fetch_text(&client, &track_url).await?;
        let timed_text: TimedText = serde_json::from_str(&raw).map_err(|e| {
            SummarizeError::LoaderError(format!("Failed to parse transcript: {}", e))
        })?;

        let transcript = transcript_text(&timed_text);
        if transcript.is_empty() {
            return Err(SummarizeError::TranscriptUnavailable(video_id));
        }

        Ok(vec![video_document(transcript, &video_id, &player)])
    }
}

/// Locate and parse the player response JSON in a watch page
fn parse_player_response(page: &str) -> Result<PlayerResponse, SummarizeError> {
    let missing =
        || SummarizeError::LoaderError("Player response not found in watch page".to_string());

    let marker = page.find(PLAYER_RESPONSE_MARKER).ok_or_else(missing)?;
    let rest = &page[marker + PLAYER_RESPONSE_MARKER.len()..];
    let start = rest.find('{').ok_or_else(missing)?;

    // The JSON object is followed by more script; parse only the first value
    serde_json::Deserializer::from_str(&rest[start..])
        .into_iter::<PlayerResponse>()
        .next()
        .ok_or_else(missing)?
        .map_err(|e| SummarizeError::LoaderError(format!("Failed to parse player response: {}", e)))
}

/// Reason a video cannot be played, if the page says so
fn unplayable_reason(player: &PlayerResponse) -> Option<String> {
    let status = player.playability_status.as_ref()?;
    match status.status.as_deref() {
        Some("OK") | None => None,
        Some(other) => Some(status.reason.clone().unwrap_or_else(|| other.to_string())),
    }
}

/// Pick a caption track for the first language that has one
///
/// Within a language, manually created tracks win over generated ones.
fn select_caption_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|t| t.language_code == *lang);
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.next())
    })
}

/// Build the `json3` transcript URL from a caption track's base URL
fn json3_url(base_url: &str, watch_url: &Url) -> Result<Url, SummarizeError> {
    let mut url = watch_url
        .join(base_url)
        .map_err(|e| SummarizeError::LoaderError(format!("Invalid caption URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");
    Ok(url)
}

/// Join caption events into one line of text
fn transcript_text(timed_text: &TimedText) -> String {
    timed_text
        .events
        .iter()
        .map(|event| {
            event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the transcript document with video info metadata
fn video_document(transcript: String, video_id: &str, player: &PlayerResponse) -> Document {
    let mut document = Document::new(transcript).with_metadata("source", video_id);

    let Some(details) = player.video_details.as_ref() else {
        return document;
    };

    if let Some(title) = &details.title {
        document = document.with_metadata("title", title.as_str());
    }
    if let Some(description) = &details.short_description {
        document = document.with_metadata("description", description.as_str());
    }
    if let Some(views) = details.view_count.as_deref().and_then(|v| v.parse::<u64>().ok()) {
        document = document.with_metadata("view_count", views);
    }
    if let Some(thumbnail) = details
        .thumbnail
        .as_ref()
        .and_then(|t| t.thumbnails.iter().max_by_key(|t| t.width.unwrap_or(0)))
    {
        document = document.with_metadata("thumbnail_url", thumbnail.url.as_str());
    }
    if let Some(date) = player
        .microformat
        .as_ref()
        .and_then(|m| m.player_microformat_renderer.as_ref())
        .and_then(|r| r.publish_date.as_deref())
    {
        document = document.with_metadata("publish_date", date);
    }
    if let Some(length) = details
        .length_seconds
        .as_deref()
        .and_then(|v| v.parse::<u64>().ok())
    {
        document = document.with_metadata("length", length);
    }
    if let Some(author) = &details.author {
        document = document.with_metadata("author", author.as_str());
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?lang={}", lang),
            language_code: lang.to_string(),
            kind: kind.map(|k| k.to_string()),
        }
    }

    #[test]
    fn test_extract_video_id_watch() {
        assert_eq!(
            extract_video_id(&url("https://www.youtube.com/watch?v=abc123")),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_video_id(&url("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42")),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_path_forms() {
        for raw in [
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?si=x",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                extract_video_id(&url(raw)),
                Some("dQw4w9WgXcQ".to_string()),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_extract_video_id_none() {
        assert_eq!(extract_video_id(&url("https://www.youtube.com/")), None);
        assert_eq!(extract_video_id(&url("https://www.youtube.com/watch")), None);
        assert_eq!(extract_video_id(&url("https://www.youtube.com/@channel")), None);
        assert_eq!(extract_video_id(&url("https://www.youtube.com/watch?v=bad%20id")), None);
        assert_eq!(extract_video_id(&url("https://example.com/?ref=youtube.com")), None);
    }

    #[test]
    fn test_matches_substring() {
        let loader = YoutubeLoader::new();
        assert!(loader.matches(&url("https://www.youtube.com/watch?v=abc123")));
        assert!(loader.matches(&url("https://example.com/?ref=youtube.com")));
        assert!(!loader.matches(&url("https://example.com/article")));
        assert!(!loader.matches(&url("https://youtu.be/abc123")));
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let loader = YoutubeLoader::with_base_url("http://127.0.0.1:1234/");
        assert_eq!(
            loader.watch_url("abc").unwrap().as_str(),
            "http://127.0.0.1:1234/watch?v=abc&hl=en"
        );
    }

    #[test]
    fn test_parse_player_response() {
        let page = r#"<script>var ytInitialPlayerResponse = {"videoDetails":{"title":"A {braced} title","author":"Someone"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://x/api/timedtext?v=1","languageCode":"en"}]}}};var meta = {};</script>"#;
        let player = parse_player_response(page).unwrap();
        let details = player.video_details.unwrap();
        assert_eq!(details.title.as_deref(), Some("A {braced} title"));
        assert_eq!(details.author.as_deref(), Some("Someone"));
        let tracks = player
            .captions
            .unwrap()
            .player_captions_tracklist_renderer
            .unwrap()
            .caption_tracks;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "en");
    }

    #[test]
    fn test_parse_player_response_missing() {
        assert!(matches!(
            parse_player_response("<html>nothing here</html>"),
            Err(SummarizeError::LoaderError(_))
        ));
    }

    #[test]
    fn test_select_caption_track_prefers_manual() {
        let tracks = vec![track("en", Some("asr")), track("en", None), track("de", None)];
        let langs = vec!["en".to_string()];
        let selected = select_caption_track(&tracks, &langs).unwrap();
        assert!(!selected.is_generated());
        assert_eq!(selected.language_code, "en");
    }

    #[test]
    fn test_select_caption_track_language_order() {
        let tracks = vec![track("en", Some("asr")), track("de", None)];
        let langs = vec!["de".to_string(), "en".to_string()];
        assert_eq!(
            select_caption_track(&tracks, &langs).unwrap().language_code,
            "de"
        );

        // Falls back to a generated track
        let langs = vec!["fr".to_string(), "en".to_string()];
        let selected = select_caption_track(&tracks, &langs).unwrap();
        assert!(selected.is_generated());

        let langs = vec!["fr".to_string()];
        assert!(select_caption_track(&tracks, &langs).is_none());
    }

    #[test]
    fn test_json3_url() {
        let watch = url("https://www.youtube.com/watch?v=abc");
        let result = json3_url("https://www.youtube.com/api/timedtext?v=abc&lang=en&fmt=srv3", &watch)
            .unwrap();
        assert_eq!(
            result.as_str(),
            "https://www.youtube.com/api/timedtext?v=abc&lang=en&fmt=json3"
        );

        // Relative base URLs resolve against the watch page
        let result = json3_url("/api/timedtext?v=abc", &watch).unwrap();
        assert_eq!(
            result.as_str(),
            "https://www.youtube.com/api/timedtext?v=abc&fmt=json3"
        );
    }

    #[test]
    fn test_transcript_text() {
        let raw = r#"{"events":[{"tStartMs":0},{"segs":[{"utf8":"hello"},{"utf8":" world"}]},{"segs":[{"utf8":"\n"}]},{"segs":[{"utf8":"second\nline"}]}]}"#;
        let timed_text: TimedText = serde_json::from_str(raw).unwrap();
        assert_eq!(transcript_text(&timed_text), "hello world second line");
    }

    #[test]
    fn test_video_document_metadata() {
        let player = PlayerResponse {
            video_details: Some(VideoDetails {
                title: Some("Title".to_string()),
                length_seconds: Some("212".to_string()),
                short_description: Some("About".to_string()),
                author: Some("Channel".to_string()),
                view_count: Some("1000".to_string()),
                thumbnail: Some(ThumbnailList {
                    thumbnails: vec![
                        Thumbnail {
                            url: "small.jpg".to_string(),
                            width: Some(120),
                        },
                        Thumbnail {
                            url: "large.jpg".to_string(),
                            width: Some(1280),
                        },
                    ],
                }),
            }),
            microformat: Some(Microformat {
                player_microformat_renderer: Some(MicroformatRenderer {
                    publish_date: Some("2009-10-24".to_string()),
                }),
            }),
            ..Default::default()
        };

        let doc = video_document("text".to_string(), "abc123", &player);
        assert_eq!(doc.text, "text");
        assert_eq!(doc.metadata_str("source"), Some("abc123"));
        assert_eq!(doc.metadata_str("title"), Some("Title"));
        assert_eq!(doc.metadata_str("description"), Some("About"));
        assert_eq!(doc.metadata_str("author"), Some("Channel"));
        assert_eq!(doc.metadata_str("thumbnail_url"), Some("large.jpg"));
        assert_eq!(doc.metadata_str("publish_date"), Some("2009-10-24"));
        assert_eq!(doc.metadata["view_count"], 1000);
        assert_eq!(doc.metadata["length"], 212);
    }

    #[test]
    fn test_unplayable_reason() {
        let player = PlayerResponse {
            playability_status: Some(PlayabilityStatus {
                status: Some("LOGIN_REQUIRED".to_string()),
                reason: Some("Sign in to confirm your age".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(
            unplayable_reason(&player),
            Some("Sign in to confirm your age".to_string())
        );
        assert_eq!(unplayable_reason(&PlayerResponse::default()), None);
    }
}
