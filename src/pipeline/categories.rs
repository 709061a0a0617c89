use crate::llm::LlmClient;

use super::Review;

/// Reviews beyond this count are left out of the prompt to bound its size.
pub const CATEGORY_REVIEW_LIMIT: usize = 10;

/// Extract dish-category labels from review text. Best-effort: any failure
/// (facade error, no JSON in the response, malformed JSON) yields an empty
/// list rather than an error, since categories only enhance the downstream
/// selection step. Model ordering is preserved as a relevance hint.
#[tracing::instrument(
    name = "pipeline_stage categories",
    skip(llm, reviews),
    fields(
        pipeline.stage = "categories",
        reviews.count = reviews.len(),
        categories.found,
    )
)]
pub async fn extract_categories(llm: &LlmClient, reviews: &[Review]) -> Vec<String> {
    let prompt = build_category_prompt(reviews);

    let categories = match llm.generate(&prompt).await {
        Ok(response) => parse_category_response(&response),
        Err(err) => {
            tracing::warn!(error = %err, "category extraction call failed, continuing without categories");
            vec![]
        }
    };

    tracing::Span::current().record("categories.found", categories.len());
    categories
}

fn build_category_prompt(reviews: &[Review]) -> String {
    let review_texts = reviews
        .iter()
        .take(CATEGORY_REVIEW_LIMIT)
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze the following restaurant reviews and extract unique dish categories mentioned \
        (e.g., Appetizers, Main Courses, Desserts, Pizza, Pasta, Seafood, etc.).\n\
        Return only a JSON array of category names, nothing else.\n\n\
        Reviews:\n{review_texts}"
    )
}

/// Scan for the first bracketed span (first `[` to the next `]`) and decode
/// it as a string array. Anything else is treated as "no categories".
fn parse_category_response(response: &str) -> Vec<String> {
    let Some(start) = response.find('[') else {
        return vec![];
    };
    let Some(len) = response[start..].find(']') else {
        return vec![];
    };
    let span = &response[start..=start + len];

    match serde_json::from_str::<Vec<String>>(span) {
        Ok(categories) => categories,
        Err(err) => {
            tracing::warn!(error = %err, "category response was not a JSON string array");
            vec![]
        }
    }
}
