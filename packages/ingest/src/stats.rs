//! Cancer-statistics CSV merge.
//!
//! The state cancer-profile export mixes county rows with state-level
//! aggregates and footnote lines. Only rows whose area column matches
//! `"<County Name>, TX"` are kept; the county name is normalized
//! (case-insensitive, `" county"` suffix stripped) and matched against
//! the county collection by name. Matched rows update the incidence
//! rate, average annual deaths, and recent-trend fields; unparseable
//! numbers become zero, consistent with the collection-wide "absent
//! means zero" convention.

use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use cancer_map_health_models::County;

use crate::IngestError;

/// CSV column holding the geographic area, primary name.
const AREA_COLUMN: &str = "Health Service Area";
/// Fallback area column used by older exports.
const AREA_COLUMN_FALLBACK: &str = "County";
/// Column holding the age-adjusted incidence rate.
const INCIDENCE_COLUMN: &str =
    "Age-Adjusted Incidence Rate([rate note]) - cases per 100,000";
/// Column holding the average annual count.
const DEATHS_COLUMN: &str = "Average Annual Count";
/// Column holding the recent 5-year trend.
const TREND_COLUMN: &str = "Recent 5-Year Trend ([trend note]) in Incidence Rates";

/// Outcome of one merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// CSV rows that looked like Texas county data.
    pub county_rows: usize,
    /// Rows that matched a county in the collection.
    pub matched: usize,
}

fn texas_county_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Matches "Angelina, TX(7)" and "Angelina, TX - Walker, TX(7)",
    // capturing the first county name.
    PATTERN.get_or_init(|| Regex::new(r"([A-Za-z\s]+), TX").expect("valid regex"))
}

/// Normalizes a county name for matching: trimmed, lowercased, with a
/// trailing `" county"` stripped.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    lowered.strip_suffix(" county").unwrap_or(&lowered).to_string()
}

/// Merges statistics from a CSV reader into the county collection.
///
/// # Errors
///
/// Returns [`IngestError`] if the CSV cannot be parsed. Rows that do
/// not look like county data are skipped, not errors.
pub fn merge_statistics<R: Read>(
    counties: &mut [County],
    reader: R,
) -> Result<MergeReport, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let area_index = headers
        .iter()
        .position(|h| h == AREA_COLUMN)
        .or_else(|| headers.iter().position(|h| h == AREA_COLUMN_FALLBACK));
    let incidence_index = headers.iter().position(|h| h == INCIDENCE_COLUMN);
    let deaths_index = headers.iter().position(|h| h == DEATHS_COLUMN);
    let trend_index = headers.iter().position(|h| h == TREND_COLUMN);

    let mut report = MergeReport::default();
    let Some(area_index) = area_index else {
        log::warn!("No area column found in CSV; nothing to merge");
        return Ok(report);
    };

    for record in csv_reader.records() {
        let record = record?;
        // The export pads footnote lines with short rows.
        if record.len() != headers.len() {
            continue;
        }
        let Some(area) = record.get(area_index) else {
            continue;
        };
        let Some(captures) = texas_county_pattern().captures(area) else {
            continue;
        };
        report.county_rows += 1;

        let wanted = normalize_name(&captures[1]);
        let Some(county) = counties
            .iter_mut()
            .find(|c| normalize_name(&c.name) == wanted)
        else {
            log::debug!("No county matches CSV area {area:?}");
            continue;
        };

        county.incidence_rate = parse_or_zero(incidence_index.and_then(|i| record.get(i)));
        county.avg_annual_deaths = parse_or_zero(deaths_index.and_then(|i| record.get(i)));
        county.recent_trend = parse_or_zero(trend_index.and_then(|i| record.get(i)));
        report.matched += 1;
    }

    log::info!(
        "Merged statistics for {} of {} county rows",
        report.matched,
        report.county_rows
    );
    Ok(report)
}

/// Runs the merge against files: reads the county collection JSON,
/// merges the CSV, and writes the merged collection back out.
///
/// # Errors
///
/// Returns [`IngestError`] if any file cannot be read/written or
/// parsed.
pub fn run(
    counties_path: &Path,
    csv_path: &Path,
    output_path: &Path,
) -> Result<MergeReport, IngestError> {
    let raw = std::fs::read_to_string(counties_path)?;
    let mut counties: Vec<County> = serde_json::from_str(&raw)?;

    let file = std::fs::File::open(csv_path)?;
    let report = merge_statistics(&mut counties, file)?;

    let merged = serde_json::to_string_pretty(&counties)?;
    std::fs::write(output_path, merged)?;
    log::info!("Merged county data written to {}", output_path.display());
    Ok(report)
}

fn parse_or_zero(field: Option<&str>) -> f64 {
    field
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}
