#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use checkvis_config::{CASE_NUMBER_PLACEHOLDER, ScraperConfig};
use checkvis_core::{CaseLookup, ScrapeResult};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, error};

pub mod page;

pub use page::StatusPageParser;

/// Reply used for any transport failure or non-2xx status.
pub const FETCH_ERROR: &str = "Error retrieving data from DVZ.";

/// Fetches and parses the public case status page.
pub struct PageScraper {
    client: Client,
    url_template: String,
    parser: StatusPageParser,
}

impl PageScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        if !config.url_template.contains(CASE_NUMBER_PLACEHOLDER) {
            anyhow::bail!(
                "Scraper URL template must contain {CASE_NUMBER_PLACEHOLDER}: {}",
                config.url_template
            );
        }
        Url::parse(&config.url_template.replace(CASE_NUMBER_PLACEHOLDER, "0"))
            .with_context(|| format!("Invalid scraper URL template: {}", config.url_template))?;

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            parser: StatusPageParser::new()?,
        })
    }

    #[must_use]
    pub fn url_for(&self, case_number: &str) -> String {
        self.url_template
            .replace(CASE_NUMBER_PLACEHOLDER, case_number)
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl CaseLookup for PageScraper {
    async fn lookup(&self, case_number: &str) -> ScrapeResult {
        let url = self.url_for(case_number);
        debug!("Fetching status page: {url}");

        let body = match self.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                error!("Error retrieving data from DVZ: {e}");
                return ScrapeResult::message(FETCH_ERROR);
            }
        };

        self.parser.parse(case_number, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::tests::status_page;
    use mockito::{Matcher, Server, ServerGuard};

    fn scraper_for(server: &ServerGuard) -> PageScraper {
        let config = ScraperConfig {
            url_template: format!(
                "{}/ResultNl.aspx?place=THR&visumnr={{case_number}}",
                server.url()
            ),
            timeout_secs: Some(5),
            ..ScraperConfig::default()
        };
        PageScraper::new(&config).unwrap_or_else(|e| panic!("scraper init failed: {e}"))
    }

    #[test]
    fn default_template_targets_infovisa() {
        let Ok(scraper) = PageScraper::new(&ScraperConfig::default()) else {
            panic!("Failed to create PageScraper");
        };
        assert_eq!(
            scraper.url_for("1234567"),
            "https://infovisa.ibz.be/ResultNl.aspx?place=THR&visumnr=1234567"
        );
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let config = ScraperConfig {
            url_template: "https://infovisa.ibz.be/ResultNl.aspx".to_string(),
            ..ScraperConfig::default()
        };
        assert!(PageScraper::new(&config).is_err());
    }

    #[tokio::test]
    async fn lookup_fetches_and_parses_status_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ResultNl.aspx")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("place".into(), "THR".into()),
                Matcher::UrlEncoded("visumnr".into(), "1234567".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(status_page("Pending", "2024-01-01", "2023-12-01"))
            .create_async()
            .await;

        let result = scraper_for(&server).lookup("1234567").await;

        mock.assert_async().await;
        assert_eq!(
            result.short_summary,
            "State: *Pending*\n(Update: _2024-01-01_)"
        );
        assert!(!result.detailed_summary.is_empty());
    }

    #[tokio::test]
    async fn server_error_becomes_fetch_error_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ResultNl.aspx")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = scraper_for(&server).lookup("1234567").await;

        mock.assert_async().await;
        assert_eq!(result, ScrapeResult::message(FETCH_ERROR));
    }

    #[tokio::test]
    async fn unreachable_host_becomes_fetch_error_message() {
        let config = ScraperConfig {
            url_template: "http://127.0.0.1:9/ResultNl.aspx?visumnr={case_number}".to_string(),
            timeout_secs: Some(2),
            ..ScraperConfig::default()
        };
        let Ok(scraper) = PageScraper::new(&config) else {
            panic!("Failed to create PageScraper");
        };
        let result = scraper.lookup("1234567").await;
        assert_eq!(result, ScrapeResult::message(FETCH_ERROR));
    }
}
