use checkvis_config::Config;
use checkvis_core::{CaseLookup, is_case_number};
use checkvis_scraper::PageScraper;

/// Input for a one-shot status lookup.
pub struct LookupInput {
    pub config: Config,
    pub case_number: String,
    /// Print the result as JSON instead of text
    pub json: bool,
}

/// Strategy for checking a single case from the command line.
///
/// Prints both the short and the detailed summary; the chat front end only
/// ever sends the short one.
#[derive(Debug, Clone, Copy)]
pub struct LookupStrategy;

impl super::CommandStrategy for LookupStrategy {
    type Input = LookupInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let case_number = input.case_number.trim();
        if !is_case_number(case_number) {
            anyhow::bail!("The case number should contain only digits.");
        }

        let scraper = PageScraper::new(&input.config.scraper)?;
        let result = scraper.lookup(case_number).await;

        if input.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{case_number}\n{}", result.short_summary);
            if !result.detailed_summary.is_empty() {
                println!("{}", result.detailed_summary);
            }
        }

        Ok(())
    }
}
