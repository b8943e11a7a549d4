//! Synthesis agent: extracts candidate statistics from web pages with an LLM.

use crate::llm::LLMClient;
use crate::types::{
    AppError, CandidateStatistic, Result, SearchResult, SynthesisRequest, SynthesisResponse,
};
use crate::utils::fetch::{truncate_content, PageFetcher};
use chrono::Utc;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;

/// Upper bound on the page text handed to the LLM, in characters.
const MAX_CONTENT_LEN: usize = 30_000;
/// Pages to analyse before any early-stop rule may fire.
const MIN_PAGES_TO_PROCESS: usize = 15;
/// Verification pass rates sit well under 100%, so oversample candidates
/// by this factor before stopping early.
const OVERSAMPLE_FACTOR: usize = 5;
/// In-flight page fetches per request.
const FETCH_CONCURRENCY: usize = 5;

pub struct SynthesisAgent {
    llm: Arc<dyn LLMClient>,
    fetcher: PageFetcher,
}

/// Per-page failure classification. Fetch and parse problems are absorbed;
/// LLM transport failures are tracked so a wholesale outage can be escalated.
enum PageFailure {
    Fetch,
    Llm,
    Parse,
}

#[derive(Debug, Deserialize)]
struct StatExtraction {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    excerpt: String,
}

impl SynthesisAgent {
    pub fn new(llm: Arc<dyn LLMClient>, fetcher: PageFetcher) -> Self {
        Self { llm, fetcher }
    }

    /// Walk the search results in order, fetching each page and asking the
    /// LLM for every statistic it contains. Individual page failures are
    /// skipped; candidates come back in encounter order.
    pub async fn synthesize(&self, req: &SynthesisRequest) -> Result<SynthesisResponse> {
        tracing::info!(
            component = "synthesis",
            topic = %req.topic,
            sources = req.search_results.len(),
            "processing search results"
        );

        let mut candidates: Vec<CandidateStatistic> = Vec::new();
        let mut pages_processed = 0usize;
        let mut llm_failures = 0usize;
        let mut pages_reaching_llm = 0usize;

        let mut pages = futures::stream::iter(req.search_results.clone())
            .map(|result| {
                analyze_page(self.llm.clone(), self.fetcher.clone(), req.topic.clone(), result)
            })
            .buffered(FETCH_CONCURRENCY);

        while let Some(outcome) = pages.next().await {
            match outcome {
                Ok(stats) => {
                    pages_processed += 1;
                    pages_reaching_llm += 1;
                    if !stats.is_empty() {
                        tracing::info!(
                            component = "synthesis",
                            topic = %req.topic,
                            extracted = stats.len(),
                            total = candidates.len() + stats.len(),
                            pages = pages_processed,
                            "extracted statistics"
                        );
                    }
                    candidates.extend(stats);
                }
                Err(PageFailure::Fetch) => {}
                Err(PageFailure::Llm) => {
                    pages_reaching_llm += 1;
                    llm_failures += 1;
                }
                Err(PageFailure::Parse) => {
                    pages_reaching_llm += 1;
                }
            }

            if pages_processed >= MIN_PAGES_TO_PROCESS {
                if req.max_statistics > 0 && candidates.len() >= req.max_statistics {
                    tracing::info!(
                        component = "synthesis",
                        max = req.max_statistics,
                        pages = pages_processed,
                        "reached max statistics"
                    );
                    break;
                }
                if candidates.len() >= req.min_statistics * OVERSAMPLE_FACTOR {
                    tracing::info!(
                        component = "synthesis",
                        candidates = candidates.len(),
                        pages = pages_processed,
                        "exceeded oversampling threshold"
                    );
                    break;
                }
            }
        }
        drop(pages);

        // Every page that got as far as the LLM failed at the transport layer:
        // the provider is down, which the orchestrator needs to know about.
        if pages_reaching_llm > 0 && llm_failures == pages_reaching_llm {
            return Err(AppError::Llm(format!(
                "LLM provider unreachable for all {} analysed pages",
                llm_failures
            )));
        }

        let sources_analyzed = req.search_results.len().min(candidates.len() / 2 + 1);

        tracing::info!(
            component = "synthesis",
            topic = %req.topic,
            candidates = candidates.len(),
            sources = sources_analyzed,
            outcome = "ok",
            "synthesis completed"
        );

        Ok(SynthesisResponse {
            topic: req.topic.clone(),
            candidates,
            sources_analyzed,
            timestamp: Utc::now(),
        })
    }

}

async fn analyze_page(
    llm: Arc<dyn LLMClient>,
    fetcher: PageFetcher,
    topic: String,
    result: SearchResult,
) -> std::result::Result<Vec<CandidateStatistic>, PageFailure> {
    let content = match fetcher.fetch(&result.url).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                component = "synthesis",
                url = %result.url,
                error = %e,
                "failed to fetch URL"
            );
            return Err(PageFailure::Fetch);
        }
    };

    let content = truncate_content(&content, MAX_CONTENT_LEN);
    let prompt = extraction_prompt(&topic, &result, content);

    let response = match llm.generate(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                component = "synthesis",
                url = %result.url,
                error = %e,
                "LLM extraction failed"
            );
            return Err(PageFailure::Llm);
        }
    };

    let extractions = match parse_extractions(&response) {
        Ok(extractions) => extractions,
        Err(e) => {
            tracing::warn!(
                component = "synthesis",
                url = %result.url,
                error = %e,
                "failed to parse LLM response"
            );
            return Err(PageFailure::Parse);
        }
    };

    Ok(extractions
        .into_iter()
        .filter(|ext| ext.value != 0.0 && !ext.excerpt.is_empty())
        .map(|ext| CandidateStatistic {
            name: ext.name,
            value: ext.value,
            unit: ext.unit,
            source: result.domain.clone(),
            source_url: result.url.clone(),
            excerpt: ext.excerpt,
        })
        .collect())
}

fn extraction_prompt(topic: &str, result: &SearchResult, content: &str) -> String {
    format!(
        r#"Analyze the following webpage content and extract ALL numerical statistics related to "{topic}".

IMPORTANT RULES:
1. Extract EVERY statistic you find, not just one or two. Be thorough and comprehensive.
2. The "value" field MUST be the exact number that appears in the excerpt - do not approximate or round
3. The "excerpt" MUST be a verbatim quote containing the exact number you put in "value"
4. The value must be a plain number with no grouping separators and no units
5. If the excerpt says "1.5°C", the value must be 1.5, not 1
6. If you cannot find an exact number in the text, skip that statistic

For each statistic found, provide:
1. name: A brief descriptive name
2. value: The EXACT numerical value from the text (as a number, not a string)
3. unit: The unit of measurement (percent, million, billion, degrees Celsius, people, countries, etc.)
4. excerpt: The verbatim excerpt from the text containing this EXACT statistic (50-200 characters)

Return valid JSON array with this structure:
[
  {{
    "name": "Global temperature rise",
    "value": 1.5,
    "unit": "degrees Celsius",
    "excerpt": "limiting global warming to 1.5°C above pre-industrial levels"
  }},
  {{
    "name": "Survey respondents",
    "value": 75000,
    "unit": "people",
    "excerpt": "Over 75,000 people across 77 countries participated"
  }}
]

CRITICAL: The value field must match the number in the excerpt exactly, character for character aside from the decimal separator and sign. Do not invent numbers.

Extract ALL statistics with clear numerical values. If the page contains 10 statistics, return 10 items in the array.
Return empty array [] ONLY if absolutely no statistics are found.

Webpage URL: {url}
Domain: {domain}

Content:
{content}

JSON output with ALL statistics:"#,
        topic = topic,
        url = result.url,
        domain = result.domain,
        content = content,
    )
}

/// Parse the LLM response as a JSON array, recovering from markdown fences
/// or surrounding prose by retrying on the first-`[`-to-last-`]` substring.
fn parse_extractions(response: &str) -> Result<Vec<StatExtraction>> {
    if let Ok(extractions) = serde_json::from_str(response) {
        return Ok(extractions);
    }

    let recovered = extract_json_array(response);
    serde_json::from_str(recovered)
        .map_err(|e| AppError::Llm(format!("unparseable extraction output: {}", e)))
}

fn extract_json_array(response: &str) -> &str {
    let trimmed = response.trim();
    match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].trim(),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, domain: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: String::new(),
            snippet: String::new(),
            domain: domain.to_string(),
        }
    }

    #[test]
    fn test_parse_plain_array() {
        let extractions = parse_extractions(
            r#"[{"name": "n", "value": 1.5, "unit": "u", "excerpt": "about 1.5 things"}]"#,
        )
        .unwrap();

        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].value, 1.5);
    }

    #[test]
    fn test_parse_recovers_from_markdown_fences() {
        let response = "Here are the statistics:\n```json\n[{\"name\": \"n\", \"value\": 42, \"unit\": \"u\", \"excerpt\": \"42 incidents were reported\"}]\n```\nLet me know if you need more.";

        let extractions = parse_extractions(response).unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].value, 42.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_extractions("no json here at all").is_err());
        assert!(parse_extractions("[{broken").is_err());
    }

    #[test]
    fn test_prompt_includes_source_context() {
        let prompt = extraction_prompt(
            "renewable energy",
            &source("https://www.iea.org/reports/renewables-2023", "iea.org"),
            "Solar capacity grew by 510 GW in 2023.",
        );

        assert!(prompt.contains("renewable energy"));
        assert!(prompt.contains("https://www.iea.org/reports/renewables-2023"));
        assert!(prompt.contains("Solar capacity grew by 510 GW in 2023."));
        assert!(prompt.contains("verbatim"));
    }

    #[tokio::test]
    async fn test_zero_value_and_empty_excerpt_discarded() {
        use crate::types::Result as AppResult;
        use async_trait::async_trait;

        struct CannedLlm;

        #[async_trait]
        impl LLMClient for CannedLlm {
            async fn generate(&self, _prompt: &str) -> AppResult<String> {
                Ok(r#"[
                    {"name": "good", "value": 7, "unit": "u", "excerpt": "all 7 of them"},
                    {"name": "zero", "value": 0, "unit": "u", "excerpt": "nothing to see"},
                    {"name": "no excerpt", "value": 3, "unit": "u", "excerpt": ""}
                ]"#
                .to_string())
            }

            async fn generate_with_system(&self, _s: &str, _p: &str) -> AppResult<String> {
                unreachable!("synthesis uses bare prompts")
            }

            fn model_name(&self) -> &str {
                "canned"
            }
        }

        // A local page server keeps the fetch path honest without real network.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/page",
            axum::routing::get(|| async { "all 7 of them were counted" }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let agent = SynthesisAgent::new(Arc::new(CannedLlm), PageFetcher::new(5).unwrap());
        let resp = agent
            .synthesize(&SynthesisRequest {
                topic: "counting".to_string(),
                search_results: vec![source(&format!("http://{}/page", addr), "localhost")],
                min_statistics: 1,
                max_statistics: 10,
            })
            .await
            .unwrap();

        assert_eq!(resp.candidates.len(), 1);
        assert_eq!(resp.candidates[0].name, "good");
        assert_eq!(resp.candidates[0].source, "localhost");
        assert_eq!(resp.candidates[0].source_url, format!("http://{}/page", addr));
    }
}
