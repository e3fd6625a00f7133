use async_trait::async_trait;
use serde::Deserialize;

use super::{LookupError, VideoLookup, VideoResult, SEARCH_SUFFIX};

const YT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const YT_MAX_RESULTS: &str = "10";

/// Searches videos with the YouTube Data API
pub struct YouTubeLookup {
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl YouTubeLookup {
    /// Creates a lookup. Without an api key every search fails as unconfigured.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl VideoLookup for YouTubeLookup {
    async fn search(&self, query: &str) -> Result<Vec<VideoResult>, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::Unconfigured)?;
        let query = format!("{query}{SEARCH_SUFFIX}");

        let response: SearchResponse = self
            .client
            .get(YT_SEARCH_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", YT_MAX_RESULTS),
                ("q", query.as_str()),
                ("key", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = response.items.ok_or(LookupError::UnexpectedResponse)?;

        Ok(items.into_iter().filter_map(SearchItem::into_result).collect())
    }
}

impl SearchItem {
    fn into_result(self) -> Option<VideoResult> {
        // Channels and playlists can show up without a video id
        let video_id = self.id.video_id?;

        Some(VideoResult {
            video_id,
            title: self.snippet.title,
            thumbnail: self
                .snippet
                .thumbnails
                .and_then(|t| t.medium)
                .map(|t| t.url),
            channel_title: self.snippet.channel_title,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{LookupError, SearchResponse, VideoLookup, YouTubeLookup};

    #[tokio::test]
    async fn missing_key_is_unconfigured() {
        let lookup = YouTubeLookup::new(Some("  ".to_string()));

        assert!(matches!(
            lookup.search("bohemian rhapsody").await,
            Err(LookupError::Unconfigured)
        ));
    }

    #[test]
    fn skips_items_without_video_id() {
        let body = r#"{
            "items": [
                {
                    "id": { "videoId": "fJ9rUzIMcZQ" },
                    "snippet": {
                        "title": "Bohemian Rhapsody",
                        "channelTitle": "Queen Official",
                        "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/fJ9rUzIMcZQ/mqdefault.jpg" } }
                    }
                },
                {
                    "id": { "channelId": "UCiMhD4jzUqG-IgPzUmmytRQ" },
                    "snippet": { "title": "Queen Official", "channelTitle": "Queen Official" }
                }
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(body).expect("response parses");
        let results: Vec<_> = response
            .items
            .expect("items exist")
            .into_iter()
            .filter_map(|i| i.into_result())
            .collect();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].video_id, "fJ9rUzIMcZQ");
        assert_eq!(
            results[0].thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/fJ9rUzIMcZQ/mqdefault.jpg")
        );
    }
}
