//! Extraction of the status fields from the DVZ result page.
//!
//! The row positions are tied to the current page layout and are not
//! validated beyond "the cell exists".

use anyhow::Result;
use checkvis_core::ScrapeResult;
use scraper::{ElementRef, Html, Selector};

/// Row holding the case state.
const STATE_ROW: usize = 5;
/// Row holding the last update date.
const DATE_ROW: usize = 6;
/// Used when `DATE_ROW` has an empty value.
const FALLBACK_DATE_ROW: usize = 4;

/// Present only when the case number is unknown upstream.
const NOT_FOUND_SELECTOR: &str = "#dossiernr";

pub struct StatusPageParser {
    not_found: Selector,
    table: Selector,
    row: Selector,
    cell: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector '{css}': {e}"))
}

/// Text of a cell with every text node trimmed and empty ones dropped.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

impl StatusPageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            not_found: selector(NOT_FOUND_SELECTOR)?,
            table: selector("table")?,
            row: selector("tr")?,
            cell: selector("th, td")?,
        })
    }

    pub fn parse(&self, case_number: &str, html: &str) -> ScrapeResult {
        let document = Html::parse_document(html);

        if document.select(&self.not_found).next().is_some() {
            return ScrapeResult::message(format!(
                "{case_number}: Your search returned no result in DVZ database."
            ));
        }

        let Some(table) = document.select(&self.table).next() else {
            return ScrapeResult::message(format!("{case_number}: Error."));
        };

        let rows: Vec<Vec<String>> = table
            .select(&self.row)
            .map(|row| row.select(&self.cell).map(cell_text).collect())
            .collect();

        let value = |index: usize| rows.get(index).and_then(|cells| cells.get(1));

        let (Some(state), Some(date)) = (value(STATE_ROW), value(DATE_ROW)) else {
            return ScrapeResult::message(format!("{case_number}: Error."));
        };
        let date = if date.is_empty() {
            match value(FALLBACK_DATE_ROW) {
                Some(d) => d,
                None => return ScrapeResult::message(format!("{case_number}: Error.")),
            }
        } else {
            date
        };

        let short_summary = format!("State: *{state}*\n(Update: _{date}_)");
        ScrapeResult::new(short_summary, detailed_summary(&rows))
    }
}

fn detailed_summary(rows: &[Vec<String>]) -> String {
    let mut out = String::from("\n");
    for cells in rows {
        let Some(label) = cells.first() else {
            continue;
        };
        out.push_str(&format!("*{label}*"));
        if let Some(value) = cells.get(1).filter(|v| !v.is_empty()) {
            out.push_str(&format!("\n_{value}_"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn status_page(state: &str, update: &str, requested: &str) -> String {
        let rows = [
            ("Visumnummer", "1234567"),
            ("Naam", "DOE"),
            ("Voornaam", "JOHN"),
            ("Post", "TEHERAN"),
            ("Datum aanvraag", requested),
            ("Status", state),
            ("Laatste wijziging", update),
            ("Opmerking", ""),
        ];
        let body: String = rows
            .iter()
            .map(|(label, value)| {
                format!("<tr>\n  <th> {label} </th>\n  <td>\n    {value}\n  </td>\n</tr>\n")
            })
            .collect();
        format!("<html><body><form><table>\n{body}</table></form></body></html>")
    }

    fn parser() -> StatusPageParser {
        StatusPageParser::new().unwrap_or_else(|e| panic!("selectors failed: {e}"))
    }

    #[test]
    fn extracts_state_and_update_date() {
        let html = status_page("Pending", "2024-01-01", "2023-12-01");
        let result = parser().parse("1234567", &html);
        assert_eq!(
            result.short_summary,
            "State: *Pending*\n(Update: _2024-01-01_)"
        );
    }

    #[test]
    fn empty_update_date_falls_back_to_request_date() {
        let html = status_page("In behandeling", "", "2023-12-01");
        let result = parser().parse("1234567", &html);
        assert_eq!(
            result.short_summary,
            "State: *In behandeling*\n(Update: _2023-12-01_)"
        );
    }

    #[test]
    fn dossiernr_element_means_no_result() {
        let html = r#"<html><body>
            <span id="dossiernr">Dossiernummer</span>
            <table><tr><td>anything</td></tr></table>
        </body></html>"#;
        for case_number in ["1", "7654321", "000000000"] {
            let result = parser().parse(case_number, html);
            assert_eq!(
                result.short_summary,
                format!("{case_number}: Your search returned no result in DVZ database.")
            );
            assert!(result.detailed_summary.is_empty());
        }
    }

    #[test]
    fn missing_table_is_an_error() {
        let result = parser().parse("42", "<html><body><p>Onderhoud</p></body></html>");
        assert_eq!(result, ScrapeResult::message("42: Error."));
    }

    #[test]
    fn truncated_table_is_an_error() {
        let html = "<table><tr><th>Status</th><td>Pending</td></tr></table>";
        let result = parser().parse("42", html);
        assert_eq!(result, ScrapeResult::message("42: Error."));
    }

    #[test]
    fn detailed_summary_lists_every_row() {
        let html = status_page("Pending", "2024-01-01", "2023-12-01");
        let result = parser().parse("1234567", &html);
        assert!(result.detailed_summary.starts_with("\n*Visumnummer*\n_1234567_\n"));
        assert!(result.detailed_summary.contains("*Status*\n_Pending_\n"));
        // Rows with an empty value carry the label only.
        assert!(result.detailed_summary.ends_with("*Opmerking*\n"));
        assert_eq!(result.detailed_summary.matches('*').count(), 16);
    }

    #[test]
    fn cell_text_joins_trimmed_fragments() {
        let html = "<table><tr><td> In <b> behandeling </b> </td></tr></table>";
        let document = Html::parse_document(html);
        let parser = parser();
        let Some(cell) = document.select(&parser.cell).next() else {
            panic!("cell not found");
        };
        assert_eq!(cell_text(cell), "Inbehandeling");
    }
}
