use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{Dish, Review, categories, dishes};

#[derive(Debug, Deserialize)]
pub struct CategoriesBody {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DishesBody {
    pub reviews: Vec<Review>,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DishesResponse {
    pub dishes: Vec<Dish>,
}

pub async fn extract_categories(
    State(state): State<AppState>,
    Json(body): Json<CategoriesBody>,
) -> AppResult<Json<CategoriesResponse>> {
    if body.reviews.is_empty() {
        return Err(AppError::Validation("reviews must not be empty".into()));
    }

    let categories = categories::extract_categories(&state.llm_client, &body.reviews).await;

    Ok(Json(CategoriesResponse { categories }))
}

pub async fn rank_dishes(
    State(state): State<AppState>,
    Json(body): Json<DishesBody>,
) -> AppResult<Json<DishesResponse>> {
    if body.reviews.is_empty() {
        return Err(AppError::Validation("reviews must not be empty".into()));
    }
    if body.categories.is_empty() {
        return Err(AppError::Validation(
            "select at least one category".into(),
        ));
    }

    let dishes = dishes::rank_top_dishes(&state.llm_client, &body.reviews, &body.categories).await?;

    Ok(Json(DishesResponse { dishes }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::config::Config;
    use crate::pipeline::test_support::{review, scripted_client};

    use super::*;

    fn state_with(response: Result<&str, ()>) -> (AppState, Arc<AtomicUsize>) {
        let (llm, calls) = scripted_client(response);
        (
            AppState {
                config: Config::for_tests(),
                llm_client: Arc::new(llm),
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_categories_route_rejects_empty_reviews_without_facade_call() {
        let (state, calls) = state_with(Ok(r#"["Mains"]"#));

        let err = extract_categories(State(state), Json(CategoriesBody { reviews: vec![] }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dishes_route_rejects_empty_reviews_without_facade_call() {
        let (state, calls) = state_with(Ok("[]"));

        let body = DishesBody {
            reviews: vec![],
            categories: vec!["Mains".to_string()],
        };
        let err = rank_dishes(State(state), Json(body)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dishes_route_rejects_empty_categories_without_facade_call() {
        let (state, calls) = state_with(Ok("[]"));

        let body = DishesBody {
            reviews: vec![review("great pad thai", 5)],
            categories: vec![],
        };
        let err = rank_dishes(State(state), Json(body)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dishes_route_returns_ranked_dishes() {
        let (state, calls) = state_with(Ok(
            r#"[{"name":"Pad Thai","category":"Main Courses","description":"loved by all","mentions":12}]"#,
        ));

        let body = DishesBody {
            reviews: vec![review("great pad thai", 5)],
            categories: vec!["Main Courses".to_string()],
        };
        let Json(response) = rank_dishes(State(state), Json(body)).await.unwrap();
        assert_eq!(response.dishes.len(), 1);
        assert_eq!(response.dishes[0].name, "Pad Thai");
        assert_eq!(response.dishes[0].rank, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_categories_body_deserialize() {
        let body: CategoriesBody = serde_json::from_str(
            r#"{"reviews": [{"text": "great pad thai", "rating": 5, "author": "Sam", "submitted_at": 1700000000}]}"#,
        )
        .unwrap();
        assert_eq!(body.reviews.len(), 1);
        assert_eq!(body.reviews[0].rating, 5);
        assert_eq!(body.reviews[0].author, "Sam");
    }

    #[test]
    fn test_dishes_body_deserialize() {
        let body: DishesBody = serde_json::from_str(
            r#"{"reviews": [{"text": "t", "rating": 4, "author": "A", "submitted_at": 1700000000}], "categories": ["Mains"]}"#,
        )
        .unwrap();
        assert_eq!(body.categories, vec!["Mains"]);
    }

    #[test]
    fn test_dishes_response_serializes_rank_and_mentions() {
        let response = DishesResponse {
            dishes: vec![Dish {
                name: "Pad Thai".into(),
                category: "Main Courses".into(),
                description: "loved by all".into(),
                mention_count: 12,
                rank: 1,
            }],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["dishes"][0]["rank"], 1);
        assert_eq!(value["dishes"][0]["mention_count"], 12);
    }
}
