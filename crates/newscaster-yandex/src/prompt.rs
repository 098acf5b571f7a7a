//! Editor prompt and extraction of the model's proposal.

use newscaster_core::{EnhanceError, EnhancedText};
use serde::Deserialize;

/// Headline limit requested from the model.
pub const PROMPT_TITLE_LIMIT: usize = 100;

/// Body limit requested from the model.
pub const PROMPT_DESCRIPTION_LIMIT: usize = 400;

/// Build the rewrite instruction for one entry.
pub fn build_prompt(title: &str, description: &str) -> String {
    format!(
        r#"You are a professional news editor. Rewrite the headline and the description of a news post for a Telegram channel so that they:
1. Are more engaging and catchy
2. Are easy to read
3. Keep the meaning of the original
4. Suit social media (use emojis and short paragraphs)
5. Have relevant emojis in the headline
6. Sound lively and interesting
7. Drop unnecessary details and keep the essence
8. Keep the headline under {title_limit} characters
9. Keep the description under {description_limit} characters
Write in the language of the original.

Answer as JSON: {{"title": "new headline", "description": "new description"}}

Original headline: {title}
Original description: {description}"#,
        title_limit = PROMPT_TITLE_LIMIT,
        description_limit = PROMPT_DESCRIPTION_LIMIT,
    )
}

#[derive(Debug, Deserialize)]
struct Proposal {
    title: Option<String>,
    description: Option<String>,
}

/// Extract the JSON object embedded in the model's answer.
///
/// The object spans from the first `{` to the last `}`; surrounding prose or
/// code fences are ignored. Missing fields keep the original values.
pub fn parse_proposal(
    answer: &str,
    original_title: &str,
    original_description: &str,
) -> Result<EnhancedText, EnhanceError> {
    let (Some(start), Some(end)) = (answer.find('{'), answer.rfind('}')) else {
        return Err(EnhanceError::Parse(format!("no JSON object in answer: {}", answer)));
    };
    if end < start {
        return Err(EnhanceError::Parse(format!("no JSON object in answer: {}", answer)));
    }

    let proposal: Proposal = serde_json::from_str(&answer[start..=end])
        .map_err(|e| EnhanceError::Parse(format!("{}: {}", e, answer)))?;

    Ok(EnhancedText {
        title: proposal.title.unwrap_or_else(|| original_title.to_string()),
        description: proposal
            .description
            .unwrap_or_else(|| original_description.to_string()),
    })
}
