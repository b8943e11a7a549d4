//! SERP provider clients and source reputability ranking.
//!
//! Mirrors the LLM module's shape: a [`SearchProvider`] trait fronts the
//! supported backends (serper, serpapi) and a factory selects one from
//! configuration.

pub mod serpapi;
pub mod serper;

use crate::types::{AppError, Result, SearchResult};
use crate::utils::config::Config;
use async_trait::async_trait;

/// A web search backend returning organic results for one query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>>;

    fn name(&self) -> &'static str;
}

/// Select and construct the configured search provider.
///
/// A missing API key for the selected provider is a startup failure.
pub fn provider_from_config(cfg: &Config) -> Result<Box<dyn SearchProvider>> {
    match cfg.search.provider.as_str() {
        "serper" => {
            if cfg.search.serper_api_key.is_empty() {
                return Err(AppError::Configuration(
                    "SERPER_API_KEY is required when SEARCH_PROVIDER=serper".to_string(),
                ));
            }
            Ok(Box::new(serper::SerperClient::new(
                cfg.search.serper_api_key.clone(),
            )?))
        }
        "serpapi" => {
            if cfg.search.serpapi_api_key.is_empty() {
                return Err(AppError::Configuration(
                    "SERPAPI_API_KEY is required when SEARCH_PROVIDER=serpapi".to_string(),
                ));
            }
            Ok(Box::new(serpapi::SerpApiClient::new(
                cfg.search.serpapi_api_key.clone(),
            )?))
        }
        other => Err(AppError::Configuration(format!(
            "unknown search provider '{}' (expected serper or serpapi)",
            other
        ))),
    }
}

/// Registrable domain of a URL: the host with any `www.` prefix stripped.
/// Unparseable URLs yield an empty string so callers can skip them.
pub fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|host| host.trim_start_matches("www.").to_string())
        .unwrap_or_default()
}

/// Research organisations and international bodies ranked alongside
/// government and educational TLDs.
const REPUTABLE_DOMAINS: &[&str] = &[
    "who.int",
    "un.org",
    "worldbank.org",
    "oecd.org",
    "imf.org",
    "pewresearch.org",
    "gallup.com",
    "nature.com",
    "science.org",
    "nasa.gov",
    "noaa.gov",
    "cdc.gov",
    "nih.gov",
    "census.gov",
    "bls.gov",
    "eurostat.ec.europa.eu",
    "iea.org",
    "ipcc.ch",
    "wmo.int",
    "statista.com",
    "ourworldindata.org",
];

/// Whether a domain counts as a reputable source. This classification drives
/// ranking only; non-reputable sources are never filtered out.
pub fn is_reputable(domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }

    if domain.ends_with(".gov") || domain.ends_with(".edu") || domain.ends_with(".mil") {
        return true;
    }

    // Country-scoped government and academic hosts, e.g. ons.gov.uk, ox.ac.uk.
    if domain.contains(".gov.") || domain.contains(".ac.") || domain.ends_with(".int") {
        return true;
    }

    REPUTABLE_DOMAINS
        .iter()
        .any(|known| domain == *known || domain.ends_with(&format!(".{}", known)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_extraction() {
        assert_eq!(
            domain_of("https://www.iea.org/reports/renewables-2023"),
            "iea.org"
        );
        assert_eq!(
            domain_of("https://climate.nasa.gov/vital-signs/"),
            "climate.nasa.gov"
        );
        assert_eq!(domain_of("not a url"), "");
    }

    #[test]
    fn test_government_and_academic_tlds_are_reputable() {
        assert!(is_reputable("nasa.gov"));
        assert!(is_reputable("climate.nasa.gov"));
        assert!(is_reputable("mit.edu"));
        assert!(is_reputable("ons.gov.uk"));
        assert!(is_reputable("ox.ac.uk"));
        assert!(is_reputable("who.int"));
    }

    #[test]
    fn test_named_organisations_are_reputable() {
        assert!(is_reputable("pewresearch.org"));
        assert!(is_reputable("data.worldbank.org"));
        assert!(is_reputable("ipcc.ch"));
    }

    #[test]
    fn test_other_domains_are_not_reputable() {
        assert!(!is_reputable("example.com"));
        assert!(!is_reputable("myblog.net"));
        assert!(!is_reputable(""));
    }
}
