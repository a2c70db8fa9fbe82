use crate::{
    Res,
    openai::{Completion, CompletionRequest, prompts::QUERY_SYSTEM_PROMPT},
    query::{ParsedQuery, SearchQuery},
    warning,
};

/// Sampling temperature for query translation; a little exploration keeps
/// repeated vibes from always landing on the same filters.
pub const QUERY_TEMPERATURE: f32 = 0.7;

/// Translates a free-text vibe into a Spotify search query.
///
/// The model's reply is parsed into the filter grammar. Tokens that don't fit
/// the grammar are dropped with a warning, so the returned query only ever
/// holds `artist:`, `album:`, `genre:`, `year:`, `tag:`, `isrc:` and `upc:`
/// filters. The query may be empty if nothing usable came back.
///
/// # Errors
///
/// Any completion service failure is returned unchanged. There is no retry.
pub async fn translate_prompt(completion: &dyn Completion, prompt: &str) -> Res<SearchQuery> {
    let reply = completion
        .complete(CompletionRequest {
            system: QUERY_SYSTEM_PROMPT.to_string(),
            user: prompt.to_string(),
            temperature: Some(QUERY_TEMPERATURE),
        })
        .await?;

    let ParsedQuery { query, dropped } = SearchQuery::parse(&reply);
    if !dropped.is_empty() {
        warning!(
            "Ignored search tokens outside the filter grammar: {}",
            dropped.join(" ")
        );
    }

    Ok(query)
}
