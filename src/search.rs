use serde::Deserialize;
use tracing::info;

use crate::api::Endpoint;
use crate::client::{decode_response, ApiClient, HttpGet, HttpResponse};
use crate::error::ClientError;
use crate::models::{Athlete, AthleteList};

// ============================================================================
// QUERY
// ============================================================================

/// Athlete lookup fields as typed into the search form. Blank fields count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub fiscode: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl SearchQuery {
    pub fn new(fiscode: Option<&str>, firstname: Option<&str>, lastname: Option<&str>) -> Self {
        SearchQuery {
            fiscode: normalize(fiscode),
            firstname: normalize(firstname),
            lastname: normalize(lastname),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fiscode.is_none() && self.firstname.is_none() && self.lastname.is_none()
    }

    /// The name endpoint for whichever name fields are present
    fn name_endpoint(&self) -> Option<Endpoint> {
        match (&self.firstname, &self.lastname) {
            (Some(first), None) => Some(Endpoint::AthletesByFirstname(first.clone())),
            (None, Some(last)) => Some(Endpoint::AthletesByLastname(last.clone())),
            (Some(first), Some(last)) => Some(Endpoint::AthletesByFullname {
                firstname: first.clone(),
                lastname: last.clone(),
            }),
            (None, None) => None,
        }
    }
}

fn normalize(field: Option<&str>) -> Option<String> {
    field.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

// ============================================================================
// RESOLVER
// ============================================================================

/// One request in a search plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStep {
    pub endpoint: Endpoint,
    /// A found (200) response on this step ends the search
    pub stop_if_found: bool,
}

/// Decides which endpoints answer a query, in order.
///
/// A fiscode is tried first. If nothing is found under it and a name was also given, exactly
/// one name search follows. Without a fiscode the name search is the only step. An empty
/// query has no steps.
pub fn resolve_search(query: &SearchQuery) -> Vec<SearchStep> {
    let mut steps = Vec::new();

    if let Some(fiscode) = &query.fiscode {
        steps.push(SearchStep {
            endpoint: Endpoint::AthleteByFiscode(fiscode.clone()),
            stop_if_found: true,
        });
    }

    if let Some(endpoint) = query.name_endpoint() {
        steps.push(SearchStep { endpoint, stop_if_found: true });
    }

    steps
}

/// The response that ended a search, with the endpoint that answered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub endpoint: Endpoint,
    pub response: HttpResponse,
}

/// Runs the plan from [`resolve_search`] one request at a time and returns the final response.
///
/// The follow-up request is only issued after the previous one has completed. Returns
/// `Ok(None)` when the query is empty and no request was made.
pub async fn search_athletes<H: HttpGet>(
    client: &ApiClient<H>,
    query: &SearchQuery,
) -> Result<Option<SearchResponse>, ClientError> {
    let steps = resolve_search(query);
    let last = steps.len().saturating_sub(1);

    for (i, step) in steps.into_iter().enumerate() {
        let response = client.get(&step.endpoint).await?;

        if i == last || (step.stop_if_found && response.is_found()) {
            return Ok(Some(SearchResponse { endpoint: step.endpoint, response }));
        }

        info!(
            endpoint = %step.endpoint,
            status = response.status,
            "nothing found, falling back to name search"
        );
    }

    Ok(None)
}

// ============================================================================
// RESULT
// ============================================================================

/// What a search turned up
#[derive(Debug, Clone, PartialEq)]
pub enum AthleteSearch {
    Single(Athlete),
    Many(Vec<Athlete>),
    NotFound,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchBody {
    Many(AthleteList),
    Single(Athlete),
}

impl AthleteSearch {
    /// Classifies the final response of a search. The fiscode endpoint answers with a single
    /// athlete object, the name endpoints with `{"athletes": [...]}`.
    pub fn from_response(response: &HttpResponse, url: String) -> Result<Self, ClientError> {
        match decode_response::<SearchBody>(response, url) {
            Ok(SearchBody::Many(list)) => Ok(AthleteSearch::Many(list.athletes)),
            Ok(SearchBody::Single(athlete)) => Ok(AthleteSearch::Single(athlete)),
            Err(ClientError::NotFound { .. }) => Ok(AthleteSearch::NotFound),
            Err(e) => Err(e),
        }
    }

    pub fn athletes(&self) -> Vec<&Athlete> {
        match self {
            AthleteSearch::Single(athlete) => vec![athlete],
            AthleteSearch::Many(athletes) => athletes.iter().collect(),
            AthleteSearch::NotFound => Vec::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
