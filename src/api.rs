use reqwest::Url;
use std::fmt;

use crate::error::ClientError;

// ============================================================================
// ENDPOINTS
// ============================================================================

/// Every read-only resource the results API exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    AthleteByFiscode(String),
    AthletesByFirstname(String),
    AthletesByLastname(String),
    AthletesByFullname { firstname: String, lastname: String },
    QualAnalysis(String),
    RaceInfo(String),
    RaceResults(String),
}

impl Endpoint {
    /// Path segments below the server root, unescaped.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::AthleteByFiscode(fiscode) => vec!["api", "athlete", "fiscode", fiscode.as_str()],
            Endpoint::AthletesByFirstname(name) => vec!["api", "athletes", "firstname", name.as_str()],
            Endpoint::AthletesByLastname(name) => vec!["api", "athletes", "lastname", name.as_str()],
            Endpoint::AthletesByFullname { firstname, lastname } => {
                vec!["api", "athletes", "fullname", firstname.as_str(), lastname.as_str()]
            }
            Endpoint::QualAnalysis(fiscode) => vec!["api", "analyze", "qual", "fiscode", fiscode.as_str()],
            Endpoint::RaceInfo(raceid) => vec!["api", "raceinfo", "raceid", raceid.as_str()],
            Endpoint::RaceResults(raceid) => vec!["api", "raceresults", "raceid", raceid.as_str()],
        }
    }

    /// Builds the absolute URL for this endpoint. Parameters are percent-encoded as
    /// individual path segments, so a name containing `/` stays one segment.
    pub fn url(&self, base: &Url) -> Result<Url, ClientError> {
        join_segments(base, &self.segments())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments().join("/"))
    }
}

// ============================================================================
// SITE LINKS
// ============================================================================

/// Link to the athlete profile page on the site
pub fn athlete_page_url(base: &Url, fiscode: &str) -> Result<Url, ClientError> {
    join_segments(base, &["athlete", fiscode])
}

/// Link to the race detail page on the site
pub fn race_page_url(base: &Url, raceid: &str) -> Result<Url, ClientError> {
    join_segments(base, &["race", raceid])
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Parses and checks a base URL for the API server
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

// ============================================================================
// TESTS
// ============================================================================
