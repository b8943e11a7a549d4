//! Research agent: turns a topic into a bounded list of candidate sources.

use crate::search::{is_reputable, SearchProvider};
use crate::types::{ResearchRequest, ResearchResponse, Result, SearchResult};
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashSet;

pub struct ResearchAgent {
    search: Box<dyn SearchProvider>,
}

impl ResearchAgent {
    pub fn new(search: Box<dyn SearchProvider>) -> Self {
        Self { search }
    }

    /// Issue one SERP query for the topic and return at most `max_statistics`
    /// deduplicated results, reputable sources first when requested.
    ///
    /// Zero hits is not an error; the caller gets an empty list with a
    /// timestamp. Page bodies are never fetched here.
    pub async fn research(&self, req: &ResearchRequest) -> Result<ResearchResponse> {
        tracing::info!(
            component = "research",
            topic = %req.topic,
            max = req.max_statistics,
            provider = self.search.name(),
            "searching for sources"
        );

        let query = format!("{} statistics", req.topic);
        let hits = self.search.search(&query, req.max_statistics).await?;

        let mut results = dedupe_by_url(hits);
        if req.reputable_only {
            rank_reputable_first(&mut results);
        }
        results.truncate(req.max_statistics);

        tracing::info!(
            component = "research",
            topic = %req.topic,
            count = results.len(),
            outcome = "ok",
            "research completed"
        );

        Ok(ResearchResponse {
            topic: req.topic.clone(),
            search_results: results,
            timestamp: Utc::now(),
        })
    }
}

fn dedupe_by_url(hits: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.url.clone()))
        .collect()
}

/// Stable sort so that encounter order is preserved within each class; this
/// is a ranking preference, never a filter.
fn rank_reputable_first(results: &mut [SearchResult]) {
    results.sort_by_key(|r| Reverse(is_reputable(&r.domain) as u8));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppError;
    use async_trait::async_trait;

    struct FixedSearch {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str, _num: usize) -> Result<Vec<SearchResult>> {
            Ok(self.results.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str, _num: usize) -> Result<Vec<SearchResult>> {
            Err(AppError::UpstreamUnavailable("serp down".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn hit(url: &str, domain: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: format!("title for {}", domain),
            snippet: String::new(),
            domain: domain.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dedupes_and_truncates() {
        let agent = ResearchAgent::new(Box::new(FixedSearch {
            results: vec![
                hit("https://a.com/1", "a.com"),
                hit("https://a.com/1", "a.com"),
                hit("https://b.com/2", "b.com"),
                hit("https://c.com/3", "c.com"),
            ],
        }));

        let resp = agent
            .research(&ResearchRequest {
                topic: "anything".to_string(),
                min_statistics: 1,
                max_statistics: 2,
                reputable_only: false,
            })
            .await
            .unwrap();

        assert_eq!(resp.search_results.len(), 2);
        assert_eq!(resp.search_results[0].url, "https://a.com/1");
        assert_eq!(resp.search_results[1].url, "https://b.com/2");
    }

    #[tokio::test]
    async fn test_reputable_ranking_is_stable_not_filtering() {
        let agent = ResearchAgent::new(Box::new(FixedSearch {
            results: vec![
                hit("https://blog.example.com/a", "blog.example.com"),
                hit("https://www.nasa.gov/b", "nasa.gov"),
                hit("https://news.example.net/c", "news.example.net"),
                hit("https://www.who.int/d", "who.int"),
            ],
        }));

        let resp = agent
            .research(&ResearchRequest {
                topic: "climate".to_string(),
                min_statistics: 1,
                max_statistics: 10,
                reputable_only: true,
            })
            .await
            .unwrap();

        let domains: Vec<&str> = resp
            .search_results
            .iter()
            .map(|r| r.domain.as_str())
            .collect();
        // Reputable first, each class keeping its encounter order, nothing dropped.
        assert_eq!(
            domains,
            vec!["nasa.gov", "who.int", "blog.example.com", "news.example.net"]
        );
    }

    #[tokio::test]
    async fn test_empty_results_are_not_an_error() {
        let agent = ResearchAgent::new(Box::new(FixedSearch { results: vec![] }));

        let resp = agent
            .research(&ResearchRequest {
                topic: "obscure topic".to_string(),
                min_statistics: 5,
                max_statistics: 10,
                reputable_only: true,
            })
            .await
            .unwrap();

        assert!(resp.search_results.is_empty());
    }

    #[tokio::test]
    async fn test_provider_outage_propagates() {
        let agent = ResearchAgent::new(Box::new(FailingSearch));

        let err = agent
            .research(&ResearchRequest {
                topic: "anything".to_string(),
                min_statistics: 5,
                max_statistics: 10,
                reputable_only: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }
}
