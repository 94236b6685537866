use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use sip_core::db::Database;
use sip_core::models::{
    ConsumptionRecord, NewConsumption, NewUser, UpdateConsumption, UpdateProfile, UserProfile,
    validate_new_user, validate_quantity_ml, validate_update_consumption, validate_update_profile,
};

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB; payloads here are tiny

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Database>>,
}

/// The authenticated session, resolved by the auth middleware and handed
/// to handlers through request extensions.
#[derive(Clone)]
struct AuthSession {
    user_id: i64,
    token: String,
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user_id: i64,
    name: String,
    expires_at: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(err) => {
                eprintln!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Middleware ---

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Map a session lookup to the authenticated user id. An unknown or
/// expired token is a 401; a failing lookup is a server error, never
/// reported to the caller as bad credentials.
fn resolve_session(lookup: anyhow::Result<Option<i64>>) -> Result<i64, ApiError> {
    match lookup {
        Ok(Some(user_id)) => Ok(user_id),
        Ok(None) => Err(ApiError::Unauthorized(
            "Invalid or missing session token".to_string(),
        )),
        Err(e) => Err(ApiError::Internal(e)),
    }
}

async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(&request) else {
        return ApiError::Unauthorized("Invalid or missing session token".to_string())
            .into_response();
    };

    let lookup = {
        let db = state
            .db
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        db.session_user(&token)
    };
    match resolve_session(lookup) {
        Ok(user_id) => {
            request
                .extensions_mut()
                .insert(AuthSession { user_id, token });
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Public handlers ---

async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let new_user = NewUser {
        name: req.name,
        email: req.email,
        password: req.password,
    };
    validate_new_user(&new_user).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if db.email_exists(&new_user.email).context("database error")? {
        return Err(ApiError::Conflict(
            "This email is already registered".to_string(),
        ));
    }
    let profile = db.register_user(&new_user).context("failed to register")?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let profile = db
        .verify_login(&req.email, &req.password)
        .context("database error")?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let session = db
        .create_session(profile.id)
        .context("failed to create session")?;
    Ok(Json(LoginResponse {
        token: session.token,
        user_id: profile.id,
        name: profile.name,
        expires_at: session.expires_at,
    }))
}

// --- Authenticated handlers ---

async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<StatusCode, ApiError> {
    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    db.delete_session(&session.token)
        .context("database error")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_consumption(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Vec<ConsumptionRecord>>, ApiError> {
    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let records = db
        .list_consumption(session.user_id)
        .context("database error")?;
    Ok(Json(records))
}

async fn create_consumption(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<NewConsumption>,
) -> Result<(StatusCode, Json<ConsumptionRecord>), ApiError> {
    validate_quantity_ml(req.quantity_ml).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let record = db
        .insert_consumption(session.user_id, &req)
        .context("failed to insert consumption record")?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_consumption(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateConsumption>,
) -> Result<Json<ConsumptionRecord>, ApiError> {
    validate_update_consumption(&req).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let record = db
        .update_consumption(id, session.user_id, &req)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound(format!("Consumption record {id} not found")))?;
    Ok(Json(record))
}

async fn delete_consumption(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if db
        .delete_consumption(id, session.user_id)
        .context("database error")?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "Consumption record {id} not found"
        )))
    }
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<UserProfile>, ApiError> {
    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let profile = db
        .get_profile(session.user_id)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<UpdateProfile>,
) -> Result<Json<UserProfile>, ApiError> {
    validate_update_profile(&req).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let db = state
        .db
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if !db
        .update_profile(session.user_id, &req)
        .context("database error")?
    {
        return Err(ApiError::NotFound("Profile not found".to_string()));
    }
    let profile = db
        .get_profile(session.user_id)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/ping", get(ping))
        .route("/api/register", post(register))
        .route("/api/login", post(login));

    let protected = Router::new()
        .route("/api/logout", post(logout))
        .route(
            "/api/consumption",
            get(list_consumption).post(create_consumption),
        )
        .route(
            "/api/consumption/{id}",
            put(update_consumption).delete(delete_consumption),
        )
        .route("/api/profile", get(get_profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(db: Database, port: u16, bind: &str) -> anyhow::Result<()> {
    let purged = db.purge_expired_sessions()?;
    if purged > 0 {
        eprintln!("Purged {purged} expired session(s)");
    }

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
    };
    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        eprintln!(
            "Listening on {bind}: any device on your network can reach this API. Accounts are password-protected."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState {
            db: Arc::new(Mutex::new(Database::open_in_memory().unwrap())),
        };
        build_router(state)
    }

    async fn send(
        app: &Router,
        request: axum::http::Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }

    async fn register_and_login(app: &Router) -> String {
        let (status, _) = send(
            app,
            post_json(
                "/api/register",
                &serde_json::json!({
                    "name": "Ana",
                    "email": "ana@example.com",
                    "password": "hunter22!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            post_json(
                "/api/login",
                &serde_json::json!({
                    "email": "ana@example.com",
                    "password": "hunter22!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn ping_is_public() {
        let app = test_app();
        let (status, body) = send(
            &app,
            axum::http::Request::get("/api/ping")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn register_returns_profile_with_default_goal() {
        let app = test_app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/register",
                &serde_json::json!({
                    "name": "Ana",
                    "email": "ana@example.com",
                    "password": "hunter22!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Ana");
        assert_eq!(body["daily_goal_liters"], 2.0);
    }

    #[tokio::test]
    async fn register_duplicate_email_returns_409() {
        let app = test_app();
        register_and_login(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/register",
                &serde_json::json!({
                    "name": "Ana Again",
                    "email": "ana@example.com",
                    "password": "hunter22!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "This email is already registered");
    }

    #[tokio::test]
    async fn register_invalid_input_returns_400() {
        let app = test_app();
        let (status, _) = send(
            &app,
            post_json(
                "/api/register",
                &serde_json::json!({
                    "name": "",
                    "email": "ana@example.com",
                    "password": "hunter22!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post_json(
                "/api/register",
                &serde_json::json!({
                    "name": "Ana",
                    "email": "not-an-email",
                    "password": "hunter22!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_wrong_password_returns_401() {
        let app = test_app();
        register_and_login(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/login",
                &serde_json::json!({
                    "email": "ana@example.com",
                    "password": "wrong-password"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn consumption_requires_token() {
        let app = test_app();
        let (status, body) = send(
            &app,
            axum::http::Request::get("/api/consumption")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or missing session token");
    }

    #[tokio::test]
    async fn bogus_token_rejected() {
        let app = test_app();
        let (status, _) = send(
            &app,
            axum::http::Request::get("/api/consumption")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn consumption_crud_flow() {
        let app = test_app();
        let token = register_and_login(&app).await;
        let auth = format!("Bearer {token}");

        // Create
        let (status, created) = send(
            &app,
            axum::http::Request::post("/api/consumption")
                .header("Authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"quantity_ml": 500, "drink_type": "water"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["quantity_ml"], 500);

        // List
        let (status, list) = send(
            &app,
            axum::http::Request::get("/api/consumption")
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        // Update
        let (status, updated) = send(
            &app,
            axum::http::Request::put(format!("/api/consumption/{id}"))
                .header("Authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"quantity_ml": 750, "drink_type": "cafe"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["quantity_ml"], 750);
        assert_eq!(updated["drink_type"], "cafe");

        // Delete
        let (status, _) = send(
            &app,
            axum::http::Request::delete(format!("/api/consumption/{id}"))
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Delete again -> 404
        let (status, _) = send(
            &app,
            axum::http::Request::delete(format!("/api/consumption/{id}"))
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_quantity() {
        let app = test_app();
        let token = register_and_login(&app).await;

        let (status, _) = send(
            &app,
            axum::http::Request::post("/api/consumption")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"quantity_ml": 0, "drink_type": "water"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_missing_record_returns_404() {
        let app = test_app();
        let token = register_and_login(&app).await;

        let (status, _) = send(
            &app,
            axum::http::Request::put("/api/consumption/999")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"quantity_ml": 100}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_get_and_partial_update() {
        let app = test_app();
        let token = register_and_login(&app).await;
        let auth = format!("Bearer {token}");

        let (status, profile) = send(
            &app,
            axum::http::Request::get("/api/profile")
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["daily_goal_liters"], 2.0);

        let (status, updated) = send(
            &app,
            axum::http::Request::put("/api/profile")
                .header("Authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"daily_goal_liters": 2.5}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["daily_goal_liters"], 2.5);
        // Name untouched by the partial update.
        assert_eq!(updated["name"], "Ana");
    }

    #[tokio::test]
    async fn profile_update_rejects_bad_goal() {
        let app = test_app();
        let token = register_and_login(&app).await;

        let (status, _) = send(
            &app,
            axum::http::Request::put("/api/profile")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"daily_goal_liters": 0.0}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let app = test_app();
        let token = register_and_login(&app).await;
        let auth = format!("Bearer {token}");

        let (status, _) = send(
            &app,
            axum::http::Request::post("/api/logout")
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            axum::http::Request::get("/api/consumption")
                .header("Authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn users_cannot_touch_each_others_records() {
        let app = test_app();
        let ana_token = register_and_login(&app).await;

        // Ana logs a drink.
        let (_, created) = send(
            &app,
            axum::http::Request::post("/api/consumption")
                .header("Authorization", format!("Bearer {ana_token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"quantity_ml": 500, "drink_type": "water"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        // Bruno registers and tries to delete it.
        let (status, _) = send(
            &app,
            post_json(
                "/api/register",
                &serde_json::json!({
                    "name": "Bruno",
                    "email": "bruno@example.com",
                    "password": "password123"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, login) = send(
            &app,
            post_json(
                "/api/login",
                &serde_json::json!({
                    "email": "bruno@example.com",
                    "password": "password123"
                }),
            ),
        )
        .await;
        let bruno_token = login["token"].as_str().unwrap();

        let (status, _) = send(
            &app,
            axum::http::Request::delete(format!("/api/consumption/{id}"))
                .header("Authorization", format!("Bearer {bruno_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(
            &app,
            axum::http::Request::get("/api/consumption")
                .header("Authorization", format!("Bearer {bruno_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn security_headers_present() {
        let app = test_app();
        let response = app
            .oneshot(
                axum::http::Request::get("/api/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let app = test_app();
        let big_body = vec![0u8; BODY_LIMIT + 1];
        let response = app
            .oneshot(
                axum::http::Request::post("/api/register")
                    .header("content-type", "application/json")
                    .body(Body::from(big_body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn session_lookup_failure_is_a_server_error_not_a_401() {
        let outcome = resolve_session(Err(anyhow::anyhow!("disk I/O error")));
        let response = outcome.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_session_token_is_a_401() {
        let outcome = resolve_session(Ok(None));
        let response = outcome.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn resolved_session_yields_the_user_id() {
        assert_eq!(resolve_session(Ok(Some(7))).unwrap(), 7);
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_details() {
        let error = ApiError::Internal(anyhow::anyhow!("secret db path /home/user/.sip/sip.db"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
        assert!(!json["error"].as_str().unwrap().contains("secret"));
    }
}
