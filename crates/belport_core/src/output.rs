use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use csv::{Terminator, WriterBuilder};

use crate::record::{COLUMNS, OutputPayload, UnitRecord};

pub const DEFAULT_CSV_FILE: &str = "latest.csv";
pub const DEFAULT_JSON_FILE: &str = "latest.json";

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path, csv_file: &str, json_file: &str) -> Self {
        Self {
            csv_path: dir.join(csv_file),
            json_path: dir.join(json_file),
        }
    }
}

/// Header from `COLUMNS`, one row per record, `\n` line endings.
pub fn render_csv(rows: &[UnitRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .context("failed to write CSV header")?;
    for row in rows {
        writer
            .write_record(row.to_row())
            .with_context(|| format!("failed to write CSV row for {}", row.name))?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|error| anyhow!("failed to flush CSV buffer: {}", error.error()))?;
    String::from_utf8(buffer).context("CSV output is not valid UTF-8")
}

pub fn render_json(payload: &OutputPayload) -> Result<String> {
    let mut rendered =
        serde_json::to_string_pretty(payload).context("failed to serialize output payload")?;
    rendered.push('\n');
    Ok(rendered)
}

/// Overwrites both artifacts. Serialization happens before the first write so
/// an encoding failure leaves the previous files untouched.
pub fn write_outputs(paths: &OutputPaths, payload: &OutputPayload) -> Result<()> {
    let csv = render_csv(&payload.rows)?;
    let json = render_json(payload)?;
    for path in [&paths.csv_path, &paths.json_path] {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&paths.csv_path, csv)
        .with_context(|| format!("failed to write {}", paths.csv_path.display()))?;
    fs::write(&paths.json_path, json)
        .with_context(|| format!("failed to write {}", paths.json_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{OutputPaths, render_csv, render_json, write_outputs};
    use crate::record::{OutputPayload, UnitRecord};
    use tempfile::tempdir;

    fn payload() -> OutputPayload {
        OutputPayload {
            source_url: "https://example.org/status".to_string(),
            scraped_at_utc: "2024-01-15T08:00:00+00:00".to_string(),
            rows: vec![
                UnitRecord {
                    name: "Löwetgeriatriken".to_string(),
                    updated_at: "2024-01-15 08:00".to_string(),
                    free_beds: -3,
                    waiting_referrals: 2,
                    message: "Full, ring \"jouren\"".to_string(),
                },
                UnitRecord::named("Ward B"),
            ],
        }
    }

    #[test]
    fn csv_has_header_and_quotes_special_fields() {
        let csv = render_csv(&payload().rows).expect("render");
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            "Geriatrikenhet,Uppdaterad senast,Lediga vårdplatser,Väntande godkända remisser,Meddelande"
        );
        assert_eq!(
            lines[1],
            "Löwetgeriatriken,2024-01-15 08:00,-3,2,\"Full, ring \"\"jouren\"\"\""
        );
        assert_eq!(lines[2], "Ward B,,0,0,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_result_still_writes_header() {
        assert_eq!(render_csv(&[]).expect("render").lines().count(), 1);
    }

    #[test]
    fn json_has_three_keys_and_keeps_non_ascii() {
        let rendered = render_json(&payload()).expect("render");
        assert!(rendered.contains("Löwetgeriatriken"));
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("parse");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 3);
        assert_eq!(object["source_url"], "https://example.org/status");
        assert_eq!(object["scraped_at_utc"], "2024-01-15T08:00:00+00:00");
        assert_eq!(object["rows"][0]["Lediga vårdplatser"], -3);
        assert_eq!(object["rows"][1]["Geriatrikenhet"], "Ward B");
    }

    #[test]
    fn write_outputs_creates_dir_and_overwrites() {
        let temp = tempdir().expect("tempdir");
        let paths = OutputPaths::in_dir(&temp.path().join("out"), "latest.csv", "latest.json");
        write_outputs(&paths, &payload()).expect("first write");

        let mut smaller = payload();
        smaller.rows.truncate(1);
        write_outputs(&paths, &smaller).expect("second write");

        let csv = std::fs::read_to_string(&paths.csv_path).expect("read csv");
        assert_eq!(csv.lines().count(), 2);
        let json = std::fs::read_to_string(&paths.json_path).expect("read json");
        let parsed: crate::record::OutputPayload = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, smaller);
    }
}
