use anyhow::{Result, bail};
use chrono::{SecondsFormat, Utc};

use crate::assemble;
use crate::classify::Classifier;
use crate::dom;
use crate::fetch::PageSource;
use crate::finalize::finalize_records;
use crate::labels::PageLabels;
use crate::output::{OutputPaths, write_outputs};
use crate::record::{OutputPayload, UnitRecord};
use crate::render::render_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseStrategy {
    /// Scan rendered text lines with bounded lookahead.
    #[default]
    Lines,
    /// Walk the table markup from capacity cells to unit headers.
    Dom,
}

impl ParseStrategy {
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("lines") {
            return Ok(Self::Lines);
        }
        if value.eq_ignore_ascii_case("dom") {
            return Ok(Self::Dom);
        }
        bail!("unsupported parse strategy: {value} (expected lines|dom)")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Dom => "dom",
        }
    }

    /// Whether the strategy can emit the same unit twice.
    pub fn produces_repeats(self) -> bool {
        matches!(self, Self::Dom)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub strategy: ParseStrategy,
    /// `None` dedupes exactly when the strategy produces repeats.
    pub dedupe: Option<bool>,
    pub labels: PageLabels,
}

impl ParseOptions {
    pub fn dedupe_enabled(&self) -> bool {
        self.dedupe.unwrap_or_else(|| self.strategy.produces_repeats())
    }
}

/// Markup to finalized records: extraction, short-name filter, optional
/// dedup, ordering by name.
pub fn parse_units(html: &str, options: &ParseOptions) -> Result<Vec<UnitRecord>> {
    let classifier = Classifier::new(options.labels.clone())?;
    let records = match options.strategy {
        ParseStrategy::Lines => assemble::extract_units(&render_lines(html), &classifier),
        ParseStrategy::Dom => dom::extract_units(html, &classifier)?,
    };
    Ok(finalize_records(records, options.dedupe_enabled()))
}

/// ISO-8601 UTC at second precision, `+00:00` offset.
pub fn capture_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub source_url: String,
    pub parse: ParseOptions,
    pub outputs: OutputPaths,
}

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub payload: OutputPayload,
    pub outputs: OutputPaths,
}

/// Fetch, parse and persist in one pass. A failed fetch returns before any
/// file is touched.
pub fn scrape_with_source<S: PageSource>(
    source: &S,
    settings: &ScrapeSettings,
) -> Result<ScrapeReport> {
    let html = source.fetch_page(&settings.source_url)?;
    let rows = parse_units(&html, &settings.parse)?;
    let payload = OutputPayload {
        source_url: settings.source_url.clone(),
        scraped_at_utc: capture_timestamp(),
        rows,
    };
    write_outputs(&settings.outputs, &payload)?;
    Ok(ScrapeReport {
        payload,
        outputs: settings.outputs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use tempfile::tempdir;

    const PAGE: &str = r#"<html><body>
        <h1>Geriatrik - lediga platser</h1>
        <table>
          <tr><td>Enhet</td><td>Disponibla</td><td>Lediga</td><td>Väntande</td></tr>
          <tr><td><span class="dataheader">Ward B</span></td></tr>
          <tr><td>Tel:</td><td>555-5678</td></tr>
          <tr><td id="rightSide">Geriatrik:</td><td>8</td><td>0</td><td></td></tr>
          <tr><td><span class="dataheader">Ward A</span></td></tr>
          <tr><td>&nbsp;</td></tr>
          <tr><td>Tel:</td><td>555-1234</td></tr>
          <tr><td>Uppdaterad: 2024-01-15 08:00</td></tr>
          <tr><td id="rightSide">Geriatrik:</td><td>10</td><td>4</td><td>1</td></tr>
          <tr><td>Meddelande: Full</td></tr>
          <tr><td><span class="dataheader">X</span></td></tr>
          <tr><td>Tel:</td><td>000</td></tr>
        </table></body></html>"#;

    struct StaticPage(&'static str);

    impl PageSource for StaticPage {
        fn fetch_page(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSource;

    impl PageSource for FailingSource {
        fn fetch_page(&self, url: &str) -> Result<String> {
            Err(anyhow!("HTTP 503 while fetching {url}"))
        }
    }

    fn expected() -> Vec<UnitRecord> {
        vec![
            UnitRecord {
                name: "Ward A".to_string(),
                updated_at: "2024-01-15 08:00".to_string(),
                free_beds: 4,
                waiting_referrals: 1,
                message: "Full".to_string(),
            },
            UnitRecord::named("Ward B"),
        ]
    }

    #[test]
    fn strategy_parse_is_case_insensitive() {
        assert_eq!(ParseStrategy::parse("LINES").expect("lines"), ParseStrategy::Lines);
        assert_eq!(ParseStrategy::parse("Dom").expect("dom"), ParseStrategy::Dom);
        assert!(ParseStrategy::parse("xpath").is_err());
    }

    #[test]
    fn dedupe_defaults_follow_strategy() {
        let mut options = ParseOptions::default();
        assert!(!options.dedupe_enabled());
        options.strategy = ParseStrategy::Dom;
        assert!(options.dedupe_enabled());
        options.dedupe = Some(false);
        assert!(!options.dedupe_enabled());
    }

    #[test]
    fn line_strategy_extracts_sorted_records() {
        let records = parse_units(PAGE, &ParseOptions::default()).expect("parse");
        assert_eq!(records, expected());
    }

    #[test]
    fn dom_strategy_agrees_with_line_strategy() {
        let options = ParseOptions {
            strategy: ParseStrategy::Dom,
            ..ParseOptions::default()
        };
        assert_eq!(parse_units(PAGE, &options).expect("parse"), expected());
    }

    #[test]
    fn page_without_units_yields_empty_result() {
        let records =
            parse_units("<html><body><p>Underhåll pågår</p></body></html>", &ParseOptions::default())
                .expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn capture_timestamp_is_utc_seconds() {
        let stamp = capture_timestamp();
        assert_eq!(stamp.len(), "2024-01-15T08:00:00+00:00".len());
        assert!(stamp.ends_with("+00:00"));
        assert_eq!(&stamp[10..11], "T");
    }

    #[test]
    fn scrape_with_source_writes_both_artifacts() {
        let temp = tempdir().expect("tempdir");
        let settings = ScrapeSettings {
            source_url: "https://example.org/status".to_string(),
            parse: ParseOptions::default(),
            outputs: OutputPaths::in_dir(temp.path(), "latest.csv", "latest.json"),
        };
        let report = scrape_with_source(&StaticPage(PAGE), &settings).expect("scrape");
        assert_eq!(report.payload.rows, expected());
        assert_eq!(report.payload.source_url, "https://example.org/status");

        let json = std::fs::read_to_string(&settings.outputs.json_path).expect("read json");
        let parsed: OutputPayload = serde_json::from_str(&json).expect("parse json");
        assert_eq!(parsed, report.payload);
        let csv = std::fs::read_to_string(&settings.outputs.csv_path).expect("read csv");
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn failed_fetch_writes_nothing() {
        let temp = tempdir().expect("tempdir");
        let settings = ScrapeSettings {
            source_url: "https://example.org/status".to_string(),
            parse: ParseOptions::default(),
            outputs: OutputPaths::in_dir(temp.path(), "latest.csv", "latest.json"),
        };
        let error = scrape_with_source(&FailingSource, &settings).expect_err("must fail");
        assert!(error.to_string().contains("HTTP 503"));
        assert!(!settings.outputs.csv_path.exists());
        assert!(!settings.outputs.json_path.exists());
    }
}
