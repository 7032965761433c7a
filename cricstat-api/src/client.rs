use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::cache::ResponseCache;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    LeaderboardResponse, LeaderboardStat, MatchFeed, MatchesResponse, RankingCategory,
    RankingsResponse, ScorecardResponse, SeriesListResponse, StatsFormat, TeamsResponse,
};

const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Cricbuzz API (via RapidAPI) with rate limiting and
/// response caching.
pub struct CricbuzzClient {
    http: reqwest::Client,
    api_key: String,
    host: String,
    base_url: String,
    last_request: Arc<Mutex<Instant>>,
    cache: ResponseCache,
}

impl CricbuzzClient {
    /// Create a client. Fails if no API key is configured.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let api_key = config.require_key()?.to_string();
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            api_key,
            host: config.host.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
            cache: ResponseCache::new(config.cache_ttl),
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch one of the match listings.
    pub async fn matches(&self, feed: MatchFeed) -> Result<MatchesResponse, ApiError> {
        self.get(&feed.path(), &[]).await
    }

    /// Fetch an ICC ranking table.
    pub async fn rankings(
        &self,
        category: RankingCategory,
        format: StatsFormat,
    ) -> Result<RankingsResponse, ApiError> {
        let path = format!("stats/v1/rankings/{}", category.as_str());
        self.get(&path, &[("formatType", format.as_str().to_string())])
            .await
    }

    /// Fetch a statistics leaderboard.
    pub async fn leaderboard(
        &self,
        stat: LeaderboardStat,
        format: StatsFormat,
    ) -> Result<LeaderboardResponse, ApiError> {
        self.get(
            "stats/v1/topstats/0",
            &[
                ("statsType", stat.as_str().to_string()),
                ("matchType", format.match_type_code().to_string()),
            ],
        )
        .await
    }

    /// Fetch the list of international teams.
    pub async fn teams(&self) -> Result<TeamsResponse, ApiError> {
        self.get("teams/v1/international", &[]).await
    }

    /// Fetch the international series calendar.
    pub async fn series(&self) -> Result<SeriesListResponse, ApiError> {
        self.get("series/v1/international", &[]).await
    }

    /// Fetch the full scorecard of one match.
    pub async fn scorecard(&self, match_id: &str) -> Result<ScorecardResponse, ApiError> {
        let id = match_id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::NotFound(format!("match '{}'", match_id)));
        }
        self.get(&format!("mcenter/v1/{}/hscard", id), &[]).await
    }

    /// Issue a cheap request to verify the key and host. Returns the number
    /// of recent matches listed.
    pub async fn check_connection(&self) -> Result<usize, ApiError> {
        let recent = self.fetch_json(&MatchFeed::Recent.path(), &[]).await?;
        let recent: MatchesResponse = decode(&MatchFeed::Recent.path(), recent)?;
        Ok(recent.matches().count())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let key = cache_key(path, query);
        let value = match self.cache.get(&key).await {
            Some(value) => {
                log::debug!("Cache hit for {}", key);
                value
            }
            None => {
                let value = self.fetch_json(path, query).await?;
                self.cache.insert(&key, value.clone()).await;
                value
            }
        };
        decode(path, value)
    }

    async fn fetch_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        self.rate_limit().await;

        log::debug!("GET {}/{}", self.base_url, path);
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        check_status(status, path, &text)?;

        // No content (e.g., no live matches) decodes as an empty object.
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|e| {
            ApiError::Decode(format!(
                "Failed to parse {}: {e}. Response: {}",
                path,
                snippet(&text)
            ))
        })
    }

    /// Enforce rate limiting: wait until at least MIN_REQUEST_INTERVAL has
    /// passed since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

fn cache_key(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", path, params.join("&"))
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("Unexpected shape for {}: {e}", path)))
}

/// Map an HTTP status to an error, if it is not a success.
pub(crate) fn check_status(
    status: reqwest::StatusCode,
    path: &str,
    body: &str,
) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ApiError::InvalidCredentials(format!(
            "Key rejected (HTTP {})",
            status.as_u16()
        )));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimit);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(path.to_string()));
    }
    Err(ApiError::ServerError {
        status: status.as_u16(),
        message: snippet(body),
    })
}
