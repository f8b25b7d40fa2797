use futures::join;
use tracing::warn;

use crate::api::{athlete_page_url, race_page_url, Endpoint};
use crate::client::{ApiClient, HttpGet};
use crate::error::ClientError;
use crate::models::{Athlete, QualAnalysis, RaceInfo, RaceResult};
use crate::race_time::{format_diff, format_diff_percentage, format_duration, format_duration_long};
use crate::search::{search_athletes, AthleteSearch, SearchQuery};

pub const NO_ATHLETE_FOUND: &str = "No athlete was found";
pub const EMPTY_QUERY: &str = "Enter a fiscode, firstname or lastname";
pub const ATHLETE_NOT_FOUND: &str = "Could not find the given athlete";
pub const ANALYSIS_NOT_FOUND: &str = "Could not find analyzed data";
pub const BAD_RESPONSE: &str = "Received a bad response from the server";

// ============================================================================
// RENDER SINK
// ============================================================================

/// Where a page writes its content
pub trait RenderSink {
    fn heading(&mut self, text: &str);
    fn field(&mut self, label: &str, value: &str);
    fn text(&mut self, text: &str);
    fn link(&mut self, label: &str, href: &str);
    fn blank(&mut self);
    /// A status message standing in for a section that could not be shown
    fn message(&mut self, text: &str);
}

/// Prints pages to stdout
#[derive(Debug, Default)]
pub struct TerminalSink;

impl RenderSink for TerminalSink {
    fn heading(&mut self, text: &str) {
        println!("\n{}", text);
        println!("{:-<80}", "");
    }

    fn field(&mut self, label: &str, value: &str) {
        println!("{}: {}", label, value);
    }

    fn text(&mut self, text: &str) {
        println!("{}", text);
    }

    fn link(&mut self, label: &str, href: &str) {
        println!("  {} -> {}", label, href);
    }

    fn blank(&mut self) {
        println!();
    }

    fn message(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// How times are shown on every page
#[derive(Debug, Clone, Copy, Default)]
pub struct PageOptions {
    /// Show an hours field instead of wrapping minutes at 60
    pub long_times: bool,
}

impl PageOptions {
    fn time(&self, ms: u64) -> String {
        if self.long_times {
            format_duration_long(ms)
        } else {
            format_duration(ms)
        }
    }
}

// ============================================================================
// HOME SEARCH
// ============================================================================

/// Looks up athletes and lists each one with a link to its profile
pub async fn render_search<H: HttpGet, S: RenderSink>(
    client: &ApiClient<H>,
    query: &SearchQuery,
    sink: &mut S,
) -> Result<AthleteSearch, ClientError> {
    sink.heading("Search results");

    let found = match search_athletes(client, query).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            sink.message(EMPTY_QUERY);
            return Ok(AthleteSearch::NotFound);
        }
        Err(e) => {
            render_failure(sink, &e);
            return Err(e);
        }
    };

    let url = found.endpoint.url(client.base_url())?.to_string();
    let result = match AthleteSearch::from_response(&found.response, url) {
        Ok(result) => result,
        Err(e) => {
            render_failure(sink, &e);
            return Err(e);
        }
    };

    let athletes = result.athletes();
    if athletes.is_empty() {
        sink.message(NO_ATHLETE_FOUND);
    }
    for athlete in athletes {
        sink.text(&format!("{}, {}", athlete.fiscode, athlete.full_name()));
        let href = athlete_page_url(client.base_url(), &athlete.fiscode)?;
        sink.link("Link", href.as_str());
    }

    Ok(result)
}

// ============================================================================
// ATHLETE PROFILE
// ============================================================================

/// Shows an athlete and their qualification history. Both are requested at once and each
/// section renders from its own result, so either can fail alone.
pub async fn render_athlete<H: HttpGet, S: RenderSink>(
    client: &ApiClient<H>,
    fiscode: &str,
    options: PageOptions,
    sink: &mut S,
) -> (Result<Athlete, ClientError>, Result<QualAnalysis, ClientError>) {
    let athlete_endpoint = Endpoint::AthleteByFiscode(fiscode.to_string());
    let analysis_endpoint = Endpoint::QualAnalysis(fiscode.to_string());
    let (athlete, analysis) = join!(
        client.fetch_json::<Athlete>(&athlete_endpoint),
        client.fetch_json::<QualAnalysis>(&analysis_endpoint)
    );

    sink.heading("Athlete");
    match &athlete {
        Ok(athlete) => render_athlete_info(athlete, sink),
        Err(e) if e.is_not_found() => sink.message(ATHLETE_NOT_FOUND),
        Err(e) => render_failure(sink, e),
    }

    sink.heading("Races");
    match &analysis {
        Ok(analysis) => render_analysis(client, analysis, options, sink),
        Err(e) if e.is_not_found() => sink.message(ANALYSIS_NOT_FOUND),
        Err(e) => render_failure(sink, e),
    }

    (athlete, analysis)
}

fn render_athlete_info<S: RenderSink>(athlete: &Athlete, sink: &mut S) {
    sink.text(&athlete.full_name());
    sink.field("Fiscode", &athlete.fiscode);
    sink.field("Birthdate", athlete.birthdate.as_deref().unwrap_or(""));
    sink.field("Nation", athlete.nation.as_deref().unwrap_or(""));
    sink.field("Club", athlete.club.as_deref().unwrap_or(""));
    sink.field("Gender", athlete.gender.as_deref().unwrap_or(""));
}

fn render_analysis<H: HttpGet, S: RenderSink>(
    client: &ApiClient<H>,
    analysis: &QualAnalysis,
    options: PageOptions,
    sink: &mut S,
) {
    for race in &analysis.races {
        sink.text(&race.raceid);
        sink.text(&race.date);
        sink.text(&format!("{}, {}", race.nation, race.location));
        sink.text(&format!("{}, {}", race.category, race.race_type));
        sink.field("Rank", &race.rank.to_string());
        sink.field("Time", &options.time(race.time));
        sink.field("Diff", &format_diff(race.diff));
        let percentage = race.diff_percentage.map(format_diff_percentage);
        sink.field("Diff percentage", percentage.as_deref().unwrap_or("--"));
        match race_page_url(client.base_url(), &race.raceid) {
            Ok(href) => sink.link("Link", href.as_str()),
            Err(e) => warn!(raceid = %race.raceid, error = %e, "could not build race link"),
        }
        sink.blank();
    }
}

// ============================================================================
// RACE DETAIL
// ============================================================================

/// Shows a race's metadata and its result list, requested concurrently
pub async fn render_race<H: HttpGet, S: RenderSink>(
    client: &ApiClient<H>,
    raceid: &str,
    options: PageOptions,
    sink: &mut S,
) -> (Result<RaceInfo, ClientError>, Result<Vec<RaceResult>, ClientError>) {
    let info_endpoint = Endpoint::RaceInfo(raceid.to_string());
    let results_endpoint = Endpoint::RaceResults(raceid.to_string());
    let (info, results) = join!(
        client.fetch_json::<RaceInfo>(&info_endpoint),
        client.fetch_json::<Vec<RaceResult>>(&results_endpoint)
    );

    sink.heading("Race");
    match &info {
        Ok(info) => render_race_info(info, sink),
        Err(e) if e.is_not_found() => {
            sink.message(&format!("Could not find the race with raceid: {}", raceid))
        }
        Err(e) => render_failure(sink, e),
    }

    sink.heading("Results");
    match &results {
        Ok(results) => render_race_results(results, options, sink),
        Err(e) if e.is_not_found() => {
            sink.message(&format!("Could not find any results for the race with raceid: {}", raceid))
        }
        Err(e) => render_failure(sink, e),
    }

    (info, results)
}

fn render_race_info<S: RenderSink>(info: &RaceInfo, sink: &mut S) {
    let fields = [
        ("Raceid", Some(info.raceid.as_str())),
        ("Codex", info.codex.as_deref()),
        ("Date", info.date.as_deref()),
        ("Nation", info.nation.as_deref()),
        ("Location", info.location.as_deref()),
        ("Category", info.category.as_deref()),
        ("Discipline", info.discipline.as_deref()),
        ("Type", info.race_type.as_deref()),
        ("Gender", info.gender.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            sink.field(label, value);
        }
    }
}

fn render_race_results<S: RenderSink>(results: &[RaceResult], options: PageOptions, sink: &mut S) {
    for result in results {
        let rank = result.rank.as_deref().unwrap_or("--");
        let bib = result.bib.as_deref().unwrap_or("");
        let nation = result.nation.as_deref().unwrap_or("");
        let time = match result.time_ms() {
            Some(ms) => options.time(ms),
            None => result.time.clone().unwrap_or_default(),
        };
        let diff = result.diff_ms().map(|ms| format_diff(ms as i64)).unwrap_or_default();

        sink.text(&format!(
            "{:>3}. {:>3} {:30} {:3} {:>10} {}",
            rank, bib, result.athlete, nation, time, diff
        ));
    }
}

// ============================================================================
// FAILURES
// ============================================================================

fn render_failure<S: RenderSink>(sink: &mut S, error: &ClientError) {
    warn!(error = %error, "could not render section");
    match error {
        ClientError::BadResponse { .. } => sink.message(BAD_RESPONSE),
        other => sink.message(&format!("Request failed: {}", other)),
    }
}
