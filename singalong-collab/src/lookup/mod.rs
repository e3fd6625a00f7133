mod youtube;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub use youtube::*;

/// Appended to every search, since rooms are for singing along
pub const SEARCH_SUFFIX: &str = " karaoke";

const MANUAL_SEARCH_URL: &str = "https://www.youtube.com/results";

/// A video found by a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct VideoResult {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub channel_title: String,
}

/// The result of a search, never failing.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub results: Vec<VideoResult>,
    /// Explains why there are no results, if the lookup was unavailable
    pub message: Option<String>,
    /// A link to search manually, if the lookup was unavailable
    pub search_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Video lookup is not configured")]
    Unconfigured,
    #[error("Video lookup request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Video lookup returned an unexpected response")]
    UnexpectedResponse,
}

/// Finds videos that members can add to a queue
#[async_trait]
pub trait VideoLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<VideoResult>, LookupError>;
}

impl SearchOutcome {
    pub fn found(results: Vec<VideoResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    /// Creates an empty outcome with a link to search manually
    pub fn fallback(query: &str, error: &LookupError) -> Self {
        let message = match error {
            LookupError::Unconfigured => {
                "Video search is not configured. Search manually and paste the video id.".to_string()
            }
            _ => "Video search is unavailable. Search manually and paste the video id.".to_string(),
        };

        Self {
            results: vec![],
            message: Some(message),
            search_url: manual_search_url(query),
        }
    }
}

/// Returns a link to the video site's own search page
pub fn manual_search_url(query: &str) -> Option<String> {
    let search_query = format!("{query}{SEARCH_SUFFIX}");

    Url::parse_with_params(MANUAL_SEARCH_URL, &[("search_query", search_query)])
        .ok()
        .map(String::from)
}

/// A lookup that is never available
pub struct NoLookup;

#[async_trait]
impl VideoLookup for NoLookup {
    async fn search(&self, _query: &str) -> Result<Vec<VideoResult>, LookupError> {
        Err(LookupError::Unconfigured)
    }
}
