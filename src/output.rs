use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ClientError;
use crate::models::{AnalyzedRace, RaceResult};
use crate::race_time::{format_diff, format_diff_percentage, format_duration};

// ============================================================================
// OUTPUT OPTIONS
// ============================================================================

/// Configuration for CSV export and filtering
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Maximum rank to include (None = all ranks). Unranked rows are dropped when set.
    pub top_n: Option<u32>,
}

impl OutputOptions {
    fn keeps(&self, rank: Option<u32>) -> bool {
        match (self.top_n, rank) {
            (None, _) => true,
            (Some(top_n), Some(rank)) => rank <= top_n,
            (Some(_), None) => false,
        }
    }
}

/// File name of the form `{prefix}_{YYYYmmdd_HHMMSS}.csv` in the working directory
pub fn default_export_path(prefix: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("{}_{}.csv", sanitize_name(prefix), stamp))
}

/// Keeps file names to ASCII letters, digits, `-` and `_`
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}

// ============================================================================
// RACE RESULTS CSV
// ============================================================================

/// Writes a race's result list to `path`
pub fn write_results_csv(
    path: &Path,
    raceid: &str,
    results: &[RaceResult],
    options: &OutputOptions,
) -> Result<(), ClientError> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "raceid", "rank", "bib", "fiscode", "athlete", "year", "nation", "time", "diff", "fispoints",
    ])?;

    for result in results {
        if !options.keeps(result.rank_number()) {
            continue;
        }

        let time = match result.time_ms() {
            Some(ms) => format_duration(ms),
            None => result.time.clone().unwrap_or_default(),
        };
        let diff = result.diff_ms().map(|ms| format_diff(ms as i64)).unwrap_or_default();

        writer.write_record([
            raceid,
            result.rank.as_deref().unwrap_or(""),
            result.bib.as_deref().unwrap_or(""),
            result.fiscode.as_deref().unwrap_or(""),
            &result.athlete,
            result.year.as_deref().unwrap_or(""),
            result.nation.as_deref().unwrap_or(""),
            &time,
            &diff,
            result.fispoints.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    info!(path = %path.display(), "race results written");
    Ok(())
}

// ============================================================================
// QUALIFICATION ANALYSIS CSV
// ============================================================================

/// Writes an athlete's analyzed race history to `path`
pub fn write_analysis_csv(
    path: &Path,
    races: &[AnalyzedRace],
    options: &OutputOptions,
) -> Result<(), ClientError> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "raceid", "date", "nation", "location", "category", "type", "gender",
        "rank", "time", "diff", "diff_percentage",
    ])?;

    for race in races {
        if !options.keeps(Some(race.rank)) {
            continue;
        }

        writer.write_record([
            race.raceid.as_str(),
            &race.date,
            &race.nation,
            &race.location,
            &race.category,
            &race.race_type,
            &race.gender,
            &race.rank.to_string(),
            &format_duration(race.time),
            &format_diff(race.diff),
            &race.diff_percentage.map(format_diff_percentage).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    info!(path = %path.display(), "analysis written");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("race 110"), "race_110");
        assert_eq!(sanitize_name("athlete_3501234"), "athlete_3501234");
        assert_eq!(sanitize_name("  "), "export");
    }

    #[test]
    fn test_default_export_path() {
        let path = default_export_path("race 110");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("race_110_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_top_n_filter() {
        let all = OutputOptions::default();
        assert!(all.keeps(None));
        assert!(all.keeps(Some(40)));

        let top = OutputOptions { top_n: Some(3) };
        assert!(top.keeps(Some(3)));
        assert!(!top.keeps(Some(4)));
        assert!(!top.keeps(None));
    }
}
