pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pages;
pub mod race_time;
pub mod search;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================
pub use api::{athlete_page_url, parse_base_url, race_page_url, Endpoint};
pub use client::{decode_response, ApiClient, HttpGet, HttpResponse, ReqwestHttp};
pub use config::{Config, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use models::{AnalyzedRace, Athlete, AthleteList, QualAnalysis, RaceInfo, RaceResult};
pub use output::{default_export_path, write_analysis_csv, write_results_csv, OutputOptions};
pub use pages::{render_athlete, render_race, render_search, PageOptions, RenderSink, TerminalSink};
pub use race_time::{format_diff, format_diff_percentage, format_duration, format_duration_long, parse_race_time};
pub use search::{resolve_search, search_athletes, AthleteSearch, SearchQuery, SearchResponse, SearchStep};

// ============================================================================
// PAGE DISPATCH
// ============================================================================

/// The pages the site serves, each an independent entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Search(SearchQuery),
    Athlete { fiscode: String },
    Race { raceid: String },
}

/// What a page fetched, for callers that export it afterwards
#[derive(Debug)]
pub enum PageData {
    Search(AthleteSearch),
    Athlete(Option<Athlete>, Option<QualAnalysis>),
    Race(Option<RaceInfo>, Option<Vec<RaceResult>>),
}

/// Renders one page. Section-level failures are shown on the sink and come back as `None`;
/// only a failed search is returned as an error.
pub async fn render_page<H: HttpGet, S: RenderSink>(
    client: &ApiClient<H>,
    page: &Page,
    options: PageOptions,
    sink: &mut S,
) -> Result<PageData, ClientError> {
    match page {
        Page::Search(query) => Ok(PageData::Search(render_search(client, query, sink).await?)),
        Page::Athlete { fiscode } => {
            let (athlete, analysis) = render_athlete(client, fiscode, options, sink).await;
            Ok(PageData::Athlete(athlete.ok(), analysis.ok()))
        }
        Page::Race { raceid } => {
            let (info, results) = render_race(client, raceid, options, sink).await;
            Ok(PageData::Race(info.ok(), results.ok()))
        }
    }
}
