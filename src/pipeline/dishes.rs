use serde::Deserialize;

use crate::llm::LlmClient;

use super::{Dish, PipelineError, Review};

/// Fixed result size; not data-dependent.
pub const TOP_DISH_COUNT: usize = 2;

/// Rank the most-praised dishes across all reviews, constrained to the given
/// categories. Unlike category extraction this stage fails hard: an empty
/// dish list would be indistinguishable from "no dishes exist", so an
/// unparseable response surfaces as `ExtractionParse` and facade errors
/// propagate unchanged.
#[tracing::instrument(
    name = "pipeline_stage dishes",
    skip(llm, reviews, categories),
    fields(
        pipeline.stage = "dishes",
        reviews.count = reviews.len(),
        categories.count = categories.len(),
        dishes.returned,
    )
)]
pub async fn rank_top_dishes(
    llm: &LlmClient,
    reviews: &[Review],
    categories: &[String],
) -> Result<Vec<Dish>, PipelineError> {
    if reviews.is_empty() {
        return Err(PipelineError::InvalidInput(
            "no reviews available for analysis".to_string(),
        ));
    }

    let prompt = build_dish_prompt(reviews, categories);
    let response = llm.generate(&prompt).await?;
    let dishes = parse_dish_response(&response)?;

    tracing::Span::current().record("dishes.returned", dishes.len());
    Ok(dishes)
}

fn build_dish_prompt(reviews: &[Review], categories: &[String]) -> String {
    let review_texts = reviews
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Review {} (Rating: {}/5):\n{}", i + 1, r.rating, r.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze the following restaurant reviews and identify the top {TOP_DISH_COUNT} most \
        mentioned and highly rated dishes in the categories: {}.\n\n\
        For each dish, provide:\n\
        - The exact dish name as mentioned in reviews\n\
        - The category it belongs to\n\
        - A brief description based on what reviewers said\n\
        - How many times it was mentioned\n\n\
        Return the results as a JSON array with this exact format:\n\
        [\n  {{\n    \"name\": \"Dish Name\",\n    \"category\": \"Category Name\",\n    \
        \"description\": \"Brief description from reviews\",\n    \"mentions\": number\n  }}\n]\n\n\
        Reviews:\n{review_texts}\n\n\
        Return ONLY the JSON array with at most {TOP_DISH_COUNT} entries, no additional text.",
        categories.join(", ")
    )
}

/// Dish objects as the model emits them; `rank` is deliberately absent and
/// any rank the model volunteers is ignored by the decode.
#[derive(Deserialize)]
struct RawDish {
    name: String,
    category: String,
    description: String,
    mentions: u32,
}

/// Take the widest bracketed span (first `[` to last `]`, tolerating
/// multi-line JSON), decode it, then truncate and re-number densely.
fn parse_dish_response(response: &str) -> Result<Vec<Dish>, PipelineError> {
    let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) else {
        return Err(PipelineError::ExtractionParse(
            "no JSON array found in model response".to_string(),
        ));
    };
    if end < start {
        return Err(PipelineError::ExtractionParse(
            "no JSON array found in model response".to_string(),
        ));
    }

    let raw: Vec<RawDish> = serde_json::from_str(&response[start..=end])
        .map_err(|e| PipelineError::ExtractionParse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .take(TOP_DISH_COUNT)
        .enumerate()
        .map(|(i, d)| Dish {
            name: d.name,
            category: d.category,
            description: d.description,
            mention_count: d.mentions,
            rank: (i + 1) as u32,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{review, scripted_client};
    use super::*;

    const THREE_DISHES: &str = r#"Here you go: [{"name":"Pad Thai","category":"Main Courses","description":"loved by all","mentions":12},{"name":"Mango Sticky Rice","category":"Desserts","description":"sweet finish","mentions":9},{"name":"Tom Yum","category":"Soups","description":"spicy","mentions":3}]"#;

    #[test]
    fn test_prompt_embeds_index_rating_and_text() {
        let reviews = vec![review("the pad thai was incredible", 5), review("soup was ok", 3)];
        let categories = vec!["Main Courses".to_string(), "Soups".to_string()];
        let prompt = build_dish_prompt(&reviews, &categories);

        assert!(prompt.contains("Review 1 (Rating: 5/5):\nthe pad thai was incredible"));
        assert!(prompt.contains("Review 2 (Rating: 3/5):\nsoup was ok"));
        assert!(prompt.contains("Main Courses, Soups"));
        assert!(prompt.contains("\"mentions\": number"));
        assert!(prompt.contains("at most 2 entries"));
    }

    #[test]
    fn test_parse_truncates_to_two_and_renumbers() {
        let dishes = parse_dish_response(THREE_DISHES).unwrap();

        assert_eq!(dishes.len(), 2);
        assert_eq!(dishes[0].name, "Pad Thai");
        assert_eq!(dishes[0].mention_count, 12);
        assert_eq!(dishes[0].rank, 1);
        assert_eq!(dishes[1].name, "Mango Sticky Rice");
        assert_eq!(dishes[1].mention_count, 9);
        assert_eq!(dishes[1].rank, 2);
    }

    #[test]
    fn test_parse_single_dish_gets_rank_one() {
        let dishes = parse_dish_response(
            r#"[{"name":"Laksa","category":"Soups","description":"rich broth","mentions":4}]"#,
        )
        .unwrap();

        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].rank, 1);
    }

    #[test]
    fn test_parse_multiline_json_with_prose() {
        let response = "Based on the reviews:\n[\n  {\n    \"name\": \"Khao Soi\",\n    \
            \"category\": \"Noodles\",\n    \"description\": \"curry noodles\",\n    \
            \"mentions\": 7\n  }\n]\nLet me know if you need more.";
        let dishes = parse_dish_response(response).unwrap();
        assert_eq!(dishes[0].name, "Khao Soi");
    }

    #[test]
    fn test_parse_model_supplied_rank_is_ignored() {
        let response = r#"[{"name":"A","category":"C","description":"d","mentions":1,"rank":9},
            {"name":"B","category":"C","description":"d","mentions":1,"rank":9}]"#;
        let dishes = parse_dish_response(response).unwrap();
        assert_eq!(dishes[0].rank, 1);
        assert_eq!(dishes[1].rank, 2);
    }

    #[test]
    fn test_parse_no_array_is_extraction_error() {
        let err = parse_dish_response("I found no dishes worth mentioning.").unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionParse(_)));
    }

    #[test]
    fn test_parse_malformed_array_is_extraction_error() {
        let err = parse_dish_response(r#"[{"name": "Pad Thai""#).unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionParse(_)));
    }

    #[tokio::test]
    async fn test_empty_reviews_fails_without_network() {
        let (llm, calls) = scripted_client(Ok(THREE_DISHES));

        let err = rank_top_dishes(&llm, &[], &["Soups".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_facade_errors_propagate_unchanged() {
        let (llm, _) = scripted_client(Err(()));
        let reviews = vec![review("great pad thai", 5)];

        let err = rank_top_dishes(&llm, &reviews, &["Mains".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Llm(crate::llm::LlmError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_hard_error() {
        let (llm, _) = scripted_client(Ok("there is no json in this answer"));
        let reviews = vec![review("great pad thai", 5)];

        let err = rank_top_dishes(&llm, &reviews, &["Mains".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionParse(_)));
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent() {
        let (llm, _) = scripted_client(Ok(THREE_DISHES));
        let reviews = vec![review("great pad thai", 5)];
        let categories = vec!["Main Courses".to_string()];

        let first = rank_top_dishes(&llm, &reviews, &categories).await.unwrap();
        let second = rank_top_dishes(&llm, &reviews, &categories).await.unwrap();
        assert_eq!(first, second);
    }
}
