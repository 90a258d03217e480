//! Profile routes for the calling user, identified by `x-user-id`.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use chrono::Utc;

use crate::errors::AppError;
use crate::models::user::{User, UserProfile, UserUpdate};
use crate::routes::guard::require_user;
use crate::state::AppState;

/// POST /api/v1/users
///
/// Creates the caller's profile on first sign-in. An existing profile is
/// returned untouched with 200.
pub async fn handle_create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(profile): Json<UserProfile>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user_id = require_user(&headers)?;
    if let Some(user) = state
        .store
        .insert_user_if_absent(&user_id, profile, Utc::now())
        .await?
    {
        return Ok((StatusCode::CREATED, Json(user)));
    }
    let existing = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok((StatusCode::OK, Json(existing)))
}

/// GET /api/v1/users/me
pub async fn handle_get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    let user_id = require_user(&headers)?;
    let user = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(user))
}

/// PUT /api/v1/users/me
/// Mirrors the identity provider's profile, creating it when absent.
pub async fn handle_sync_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(profile): Json<UserProfile>,
) -> Result<Json<User>, AppError> {
    let user_id = require_user(&headers)?;
    Ok(Json(
        state
            .store
            .upsert_user(&user_id, profile, Utc::now())
            .await?,
    ))
}

/// PATCH /api/v1/users/me
pub async fn handle_update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    let user_id = require_user(&headers)?;
    let user = state
        .store
        .update_user(&user_id, update, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ingest::providers::ProviderEndpoints;
    use crate::ingest::testing::ScriptedClient;
    use crate::ingest::Ingestor;
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::store::memory::MemoryStore;

    fn app(store: Arc<MemoryStore>) -> Router {
        let ingestor = Arc::new(Ingestor::new(
            store.clone(),
            Arc::new(ScriptedClient::new()),
            ProviderEndpoints::default(),
        ));
        build_router(AppState {
            store,
            ingestor,
            config: Config::for_tests(),
        })
    }

    fn json_request(method: &str, uri: &str, user: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", user)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn profile(name: &str) -> Value {
        json!({
            "name": name,
            "email": "ada@example.com",
            "clerkId": "clerk_1",
            "image": "https://img.example/ada.png"
        })
    }

    #[tokio::test]
    async fn test_create_only_when_absent() {
        let router = app(Arc::new(MemoryStore::new()));

        let first = router
            .clone()
            .oneshot(json_request("POST", "/api/v1/users", "user_1", profile("Ada")))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = router
            .oneshot(json_request("POST", "/api/v1/users", "user_1", profile("Someone")))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(second).await["name"], "Ada");
    }

    #[tokio::test]
    async fn test_sync_creates_then_overwrites() {
        let router = app(Arc::new(MemoryStore::new()));

        let created = router
            .clone()
            .oneshot(json_request("PUT", "/api/v1/users/me", "user_1", profile("Ada")))
            .await
            .unwrap();
        assert_eq!(body_json(created).await["userId"], "user_1");

        let synced = router
            .clone()
            .oneshot(json_request("PUT", "/api/v1/users/me", "user_1", profile("Ada L.")))
            .await
            .unwrap();
        assert_eq!(body_json(synced).await["name"], "Ada L.");

        let fetched = router
            .oneshot(
                Request::get("/api/v1/users/me")
                    .header("x-user-id", "user_1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(fetched).await["name"], "Ada L.");
    }

    #[tokio::test]
    async fn test_update_patches_given_fields() {
        let router = app(Arc::new(MemoryStore::new()));
        router
            .clone()
            .oneshot(json_request("POST", "/api/v1/users", "user_1", profile("Ada")))
            .await
            .unwrap();

        let response = router
            .oneshot(json_request(
                "PATCH",
                "/api/v1/users/me",
                "user_1",
                json!({ "email": "ada@new.example" }),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["email"], "ada@new.example");
        assert_eq!(body["name"], "Ada");
    }

    #[tokio::test]
    async fn test_update_missing_user_is_404() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(json_request(
                "PATCH",
                "/api/v1/users/me",
                "ghost",
                json!({ "name": "Nobody" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_routes_require_forwarded_user() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(Request::get("/api/v1/users/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
