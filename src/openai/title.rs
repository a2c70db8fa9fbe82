use crate::{
    Res,
    error::Error,
    openai::{Completion, CompletionRequest, prompts::TITLE_SYSTEM_PROMPT},
    utils,
};

/// Generates a short playlist title for the vibe.
///
/// Uses the service's default sampling. Quotes wrapped around the whole title
/// are removed; the length is left to the catalog's own limits.
pub async fn generate_title(completion: &dyn Completion, prompt: &str) -> Res<String> {
    let reply = completion
        .complete(CompletionRequest {
            system: TITLE_SYSTEM_PROMPT.to_string(),
            user: prompt.to_string(),
            temperature: None,
        })
        .await?;

    let title = utils::strip_wrapping_quotes(&reply);
    if title.is_empty() {
        return Err(Error::Parse("generated title is empty".to_string()));
    }

    Ok(title)
}
