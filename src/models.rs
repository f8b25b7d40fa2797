use serde::{Deserialize, Deserializer, Serialize};

use crate::race_time::parse_race_time;

// ============================================================================
// ATHLETES
// ============================================================================

/// Athlete record as served by `/api/athlete/...` and `/api/athletes/...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    #[serde(deserialize_with = "string_or_number")]
    pub fiscode: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub competitorid: Option<String>,
}

impl Athlete {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }
}

/// Body of the name searches
#[derive(Debug, Clone, Deserialize)]
pub struct AthleteList {
    pub athletes: Vec<Athlete>,
}

// ============================================================================
// QUALIFICATION ANALYSIS
// ============================================================================

/// Body of `/api/analyze/qual/fiscode/{fiscode}`
#[derive(Debug, Clone, Deserialize)]
pub struct QualAnalysis {
    #[serde(default)]
    pub races: Vec<AnalyzedRace>,
}

/// One race in an athlete's qualification history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedRace {
    #[serde(deserialize_with = "string_or_number")]
    pub raceid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub fiscode: Option<String>,
    pub rank: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub nation: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub race_type: String,
    #[serde(default)]
    pub gender: String,
    /// Race time in milliseconds
    pub time: u64,
    /// Gap to the winner in milliseconds
    #[serde(default)]
    pub diff: i64,
    /// Time relative to the winner, 1.0 being the winning time. The server sends null when it
    /// has no time to compare (DNF rows).
    #[serde(rename = "diff percentage", default)]
    pub diff_percentage: Option<f64>,
}

// ============================================================================
// RACES
// ============================================================================

/// Body of `/api/raceinfo/raceid/{raceid}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub raceid: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub codex: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(rename = "type", default)]
    pub race_type: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// One row of `/api/raceresults/raceid/{raceid}`. The upstream data keeps every column as
/// text, so numbers are accepted either way and times stay in their published form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub bib: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub fiscode: Option<String>,
    #[serde(default)]
    pub athlete: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub diff: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub fispoints: Option<String>,
}

impl RaceResult {
    /// Numeric rank, or None for DNF/DSQ rows
    pub fn rank_number(&self) -> Option<u32> {
        self.rank.as_deref()?.trim().parse().ok()
    }

    pub fn time_ms(&self) -> Option<u64> {
        parse_race_time(self.time.as_deref()?)
    }

    /// The winner's diff repeats the winning time upstream, so a diff equal to the time counts as none.
    pub fn diff_ms(&self) -> Option<u64> {
        let diff = self.diff.as_deref()?;
        if Some(diff) == self.time.as_deref() {
            return None;
        }
        parse_race_time(diff)
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

/// Null and empty strings both become None
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(String::from).filter(|s| !s.trim().is_empty()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_athlete_with_string_fiscode() {
        let json = r#"{
            "fiscode": "3501234",
            "competitorid": "191919",
            "firstname": "Jane",
            "lastname": "Doe",
            "nation": "SWE",
            "birthdate": "1999-02-03",
            "gender": "F",
            "club": "IFK Umea"
        }"#;
        let athlete: Athlete = serde_json::from_str(json).unwrap();
        assert_eq!(athlete.fiscode, "3501234");
        assert_eq!(athlete.competitorid.as_deref(), Some("191919"));
        assert_eq!(athlete.full_name(), "Jane Doe");
        assert_eq!(athlete.club.as_deref(), Some("IFK Umea"));
    }

    #[test]
    fn test_athlete_with_numeric_fiscode_and_missing_fields() {
        let athlete: Athlete = serde_json::from_str(r#"{"fiscode": 3501234, "lastname": "Doe"}"#).unwrap();
        assert_eq!(athlete.fiscode, "3501234");
        assert_eq!(athlete.full_name(), "Doe");
        assert!(athlete.birthdate.is_none());
    }

    #[test]
    fn test_qual_analysis() {
        let json = r#"{"races": [{
            "raceid": 110, "name": "DOE Jane", "fiscode": 3501234, "rank": 3,
            "date": "2022-12-03", "nation": "NOR", "location": "Beitostolen",
            "category": "WC", "type": "SQ", "gender": "W",
            "time": 183450, "diff": 2310, "diff percentage": 1.0127
        }]}"#;
        let analysis: QualAnalysis = serde_json::from_str(json).unwrap();
        let race = &analysis.races[0];
        assert_eq!(race.raceid, "110");
        assert_eq!(race.fiscode.as_deref(), Some("3501234"));
        assert_eq!(race.race_type, "SQ");
        assert_eq!(race.time, 183_450);
        assert_eq!(race.diff, 2310);
        assert!((race.diff_percentage.unwrap() - 1.0127).abs() < 1e-9);
    }

    #[test]
    fn test_qual_analysis_tolerates_null_percentage() {
        let json = r#"{"races": [
            {"raceid": 110, "rank": 1, "time": 183450, "diff": 0, "diff percentage": 1.0},
            {"raceid": 111, "rank": 0, "time": 0, "diff": 0, "diff percentage": null},
            {"raceid": 112, "rank": 4, "time": 190000}
        ]}"#;
        let analysis: QualAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.races.len(), 3);
        assert_eq!(analysis.races[0].diff_percentage, Some(1.0));
        assert_eq!(analysis.races[1].diff_percentage, None);
        assert_eq!(analysis.races[2].diff_percentage, None);
    }

    #[test]
    fn test_race_result_text_columns() {
        let json = r#"{
            "rank": "2", "bib": "14", "fiscode": "3501234", "athlete": "DOE Jane",
            "year": "1999", "nation": "SWE", "time": "3:03.45", "diff": "+0.62", "fispoints": "12.40"
        }"#;
        let result: RaceResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.rank_number(), Some(2));
        assert_eq!(result.time_ms(), Some(183_450));
        assert_eq!(result.diff_ms(), Some(620));
    }

    #[test]
    fn test_race_result_winner_and_dnf() {
        let winner: RaceResult =
            serde_json::from_str(r#"{"rank": "1", "athlete": "A", "time": "3:02.83", "diff": "3:02.83"}"#).unwrap();
        assert_eq!(winner.diff_ms(), None);

        let dnf: RaceResult = serde_json::from_str(r#"{"rank": "", "athlete": "B", "time": "", "diff": null}"#).unwrap();
        assert_eq!(dnf.rank, None);
        assert_eq!(dnf.rank_number(), None);
        assert_eq!(dnf.time_ms(), None);
    }

    #[test]
    fn test_race_result_with_oversized_time() {
        let result: RaceResult =
            serde_json::from_str(r#"{"athlete": "X", "time": "99999999999999999:00.00", "diff": "+1:00.00"}"#).unwrap();
        assert_eq!(result.time_ms(), None);
        assert_eq!(result.time.as_deref(), Some("99999999999999999:00.00"));
        assert_eq!(result.diff_ms(), Some(60_000));
    }

    #[test]
    fn test_race_info() {
        let json = r#"{"raceid": "110", "codex": 3045, "date": "2022-12-03", "location": "Beitostolen",
                       "discipline": "Sprint", "type": "SQ", "gender": "W"}"#;
        let info: RaceInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.raceid, "110");
        assert_eq!(info.codex.as_deref(), Some("3045"));
        assert_eq!(info.race_type.as_deref(), Some("SQ"));
        assert!(info.nation.is_none());
    }
}
