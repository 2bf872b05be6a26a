use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::model::{NewsArticle, Sentiment};
use crate::core::pair::CurrencyPair;
use crate::core::source::{NewsSource, SourceResult};
use crate::providers::fallback::FallbackGenerator;
use crate::providers::{USER_AGENT, recover};

/// Market news from `GET /api/news/{pair}`, ordered by the source's own
/// relevance ranking.
pub struct HttpNewsSource {
    base_url: String,
    fallback: FallbackGenerator,
}

impl HttpNewsSource {
    pub fn new(base_url: &str, fallback: FallbackGenerator) -> Self {
        HttpNewsSource {
            base_url: base_url.to_string(),
            fallback,
        }
    }

    async fn request(&self, pair: CurrencyPair) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/api/news/{}", self.base_url, pair);
        debug!("Requesting news from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {}", e, pair))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from news endpoint for pair: {}",
                response.status(),
                pair
            ));
        }

        let data = response
            .json::<NewsResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse news response for {}: {}", pair, e))?;

        let articles = data
            .articles
            .into_iter()
            .map(|wire| NewsArticle {
                id: wire.id,
                title: wire.title,
                content: wire.content,
                source: wire.source,
                timestamp: wire.timestamp,
                // Unscored articles read as neutral.
                sentiment: wire.sentiment.unwrap_or_else(Sentiment::neutral),
            })
            .collect();
        Ok(articles)
    }
}

#[derive(Deserialize, Debug)]
struct NewsResponse {
    articles: Vec<WireArticle>,
}

#[derive(Deserialize, Debug)]
struct WireArticle {
    id: String,
    title: String,
    content: String,
    source: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    sentiment: Option<Sentiment>,
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    #[instrument(name = "NewsFetch", skip(self), fields(pair = %pair))]
    async fn fetch_news(&self, pair: CurrencyPair) -> SourceResult<Vec<NewsArticle>> {
        recover("news", self.request(pair).await, || self.fallback.news(pair))
    }
}
