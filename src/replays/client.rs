//! Showdown replay server client.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::fetch::{endpoint, FetchError, Fetcher};
use crate::models::ReplayRecord;

/// One entry of the replay search feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaySummary {
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub private: bool,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub rating: Option<f64>,
}

/// The feed marks private replays with `true` or `1`; absent or null means public.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match val {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        Some(serde_json::Value::String(s)) => !s.is_empty() && s != "0",
        _ => false,
    })
}

/// Collect up to `max_replays` public ids from successive pages.
///
/// `fetch_page` is called with page numbers `1..=max_pages` until enough ids
/// are collected or a page comes back empty.
pub async fn collect_ids<F, Fut>(
    max_replays: usize,
    max_pages: u32,
    mut fetch_page: F,
) -> Result<Vec<String>, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<ReplaySummary>, FetchError>>,
{
    let mut ids = Vec::new();
    let mut page = 1;

    while ids.len() < max_replays && page <= max_pages {
        let summaries = fetch_page(page).await?;
        if summaries.is_empty() {
            debug!("Search page {} is empty, feed exhausted", page);
            break;
        }

        for summary in summaries {
            if summary.private {
                continue;
            }
            ids.push(summary.id);
            if ids.len() >= max_replays {
                break;
            }
        }
        page += 1;
    }

    Ok(ids)
}

/// Client for the replay search and detail endpoints.
pub struct ShowdownClient {
    search: Fetcher,
    replays: Fetcher,
    base_url: String,
}

impl ShowdownClient {
    /// `search` paces the search feed, `replays` paces replay downloads.
    pub fn new(search: Fetcher, replays: Fetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            search,
            replays,
            base_url,
        }
    }

    /// Fetch one page of the search feed for `format`.
    pub async fn search_page(&self, format: &str, page: u32) -> Result<Vec<ReplaySummary>, FetchError> {
        let mut url = endpoint(&self.base_url, &["search.json"])?;
        url.query_pairs_mut()
            .append_pair("format", format)
            .append_pair("page", &page.to_string());

        debug!("Showdown: fetching search page {} for {}", page, format);
        self.search.get_json_fresh(&url).await
    }
}

/// Where replays come from.
#[async_trait]
pub trait ReplaySource: Send + Sync {
    /// Public replay ids for `format`, newest first.
    async fn collect_replay_ids(
        &self,
        format: &str,
        max_replays: usize,
        max_pages: u32,
    ) -> Result<Vec<String>, FetchError>;

    /// Download one replay record.
    async fn fetch_replay(&self, replay_id: &str) -> Result<ReplayRecord, FetchError>;
}

#[async_trait]
impl ReplaySource for ShowdownClient {
    async fn collect_replay_ids(
        &self,
        format: &str,
        max_replays: usize,
        max_pages: u32,
    ) -> Result<Vec<String>, FetchError> {
        let ids = collect_ids(max_replays, max_pages, move |page| {
            self.search_page(format, page)
        })
        .await?;
        info!("Showdown: collected {} replay ids for {}", ids.len(), format);
        Ok(ids)
    }

    async fn fetch_replay(&self, replay_id: &str) -> Result<ReplayRecord, FetchError> {
        let url = endpoint(&self.base_url, &[&format!("{}.json", replay_id)])?;
        self.replays.get_json(&url).await
    }
}
