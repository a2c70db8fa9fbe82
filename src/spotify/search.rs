use crate::{Res, query::SearchQuery, spotify::Catalog, types::TrackRef};

/// Maximum number of tracks a single search asks for.
pub const SEARCH_LIMIT: u32 = 50;

/// What a catalog search found. Failures are the `Err` side of the result,
/// so "nothing matched" and "the call failed" never look alike.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Tracks(Vec<TrackRef>),
    Empty,
}

/// Runs a track search and keeps the provider's relevance order.
///
/// A query without any filter is answered with [`SearchOutcome::Empty`]
/// without calling the catalog.
pub async fn search_tracks(
    catalog: &dyn Catalog,
    token: &str,
    query: &SearchQuery,
) -> Res<SearchOutcome> {
    if query.is_empty() {
        return Ok(SearchOutcome::Empty);
    }

    let mut tracks = catalog
        .search_tracks(token, &query.to_string(), SEARCH_LIMIT)
        .await?;
    tracks.truncate(SEARCH_LIMIT as usize);

    if tracks.is_empty() {
        Ok(SearchOutcome::Empty)
    } else {
        Ok(SearchOutcome::Tracks(tracks))
    }
}
