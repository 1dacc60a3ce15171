use analytics::{AnalyticsEngine, AnalyticsResponse};
use app_config::types::{ServerSettings, SessionSettings};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use core_types::{NewTrade, Trade, TradeUpdate, User};
use database::Db;
use extract::CurrentUser;
use tokio::net::TcpListener;
use types::CredentialsRequest;

pub mod error;
pub mod extract;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    /// Lifetime of a newly created login session.
    pub session_ttl: Duration,
}

/// Creates the main application router with all routes and middleware.
///
/// # Arguments
///
/// * `app_state`: The shared `AppState` containing resources like the DB pool.
///
/// # Returns
///
/// The configured `axum::Router`.
pub fn create_router(app_state: AppState) -> Router {
    // Define a CORS layer to allow requests from our frontend.
    // In a production environment, you would restrict the origin to your actual frontend domain.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any) // For development, allow any origin
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    // Define the API sub-router. Everything except the auth entry points
    // requires a valid session cookie, enforced by the CurrentUser extractor.
    let api_router = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/trades", get(list_trades_handler).post(create_trade_handler))
        .route(
            "/trades/{id}",
            get(get_trade_handler)
                .put(update_trade_handler)
                .delete(delete_trade_handler),
        )
        .route("/analytics", get(get_analytics_handler));

    // The main router.
    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// A simple health check handler.
/// Responds with a 200 OK and a plain body.
async fn health_check_handler() -> &'static str {
    "OK"
}

// --- Auth handlers ---

/// Handler for `POST /api/auth/register`.
async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    types::validate_credentials(&request)?;

    let password_hash = auth::hash_password(&request.password)?;
    let user = state.db.create_user(&request.email, &password_hash).await?;

    tracing::info!(user_id = user.id, "Registered new user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for `POST /api/auth/login`.
/// On success the response carries the session cookie.
async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    let Some((user, password_hash)) = state.db.get_user_with_password(&request.email).await?
    else {
        return Err(Error::InvalidCredentials);
    };

    if !auth::verify_password(&request.password, &password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    let token = auth::generate_session_token();
    let expires_at = Utc::now() + state.session_ttl;
    state.db.create_session(&token, user.id, expires_at).await?;

    tracing::info!(user_id = user.id, "User logged in");
    let cookie = session_cookie(&token, state.session_ttl.num_seconds());
    Ok(([(header::SET_COOKIE, cookie)], Json(user)))
}

/// Handler for `POST /api/auth/logout`.
/// Deleting an unknown or absent session is still a successful logout.
async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    if let Some(token) = extract::session_token(&headers) {
        state.db.delete_session(&token).await?;
    }

    // Expire the cookie on the client regardless.
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session_cookie("", 0))],
    ))
}

/// Handler for `GET /api/auth/me`.
async fn me_handler(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

// --- Trade handlers ---

/// Handler for `GET /api/trades`.
/// Returns all of the caller's trades, newest entry first.
async fn list_trades_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Trade>>> {
    let trades = state.db.list_trades(user.id).await?;
    Ok(Json(trades))
}

/// Handler for `GET /api/trades/{id}`.
async fn get_trade_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Trade>> {
    match state.db.get_trade(id, user.id).await? {
        Some(trade) => Ok(Json(trade)),
        None => Err(Error::NotFound("Trade not found".to_string())),
    }
}

/// Handler for `POST /api/trades`.
async fn create_trade_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(new_trade): Json<NewTrade>,
) -> Result<impl IntoResponse> {
    types::validate_new_trade(&new_trade)?;

    let trade = state.db.create_trade(user.id, &new_trade).await?;
    tracing::info!(user_id = user.id, trade_id = trade.id, "Created trade");
    Ok((StatusCode::CREATED, Json(trade)))
}

/// Handler for `PUT /api/trades/{id}`.
/// Fields missing from the body keep their stored values.
async fn update_trade_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<TradeUpdate>,
) -> Result<Json<Trade>> {
    types::validate_trade_update(&update)?;

    match state.db.update_trade(id, user.id, &update).await? {
        Some(trade) => Ok(Json(trade)),
        None => Err(Error::NotFound("Trade not found".to_string())),
    }
}

/// Handler for `DELETE /api/trades/{id}`.
async fn delete_trade_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if state.db.delete_trade(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound("Trade not found".to_string()))
    }
}

// --- Analytics ---

/// Handler for `GET /api/analytics`.
/// Loads the caller's full trade history and recomputes the summary; nothing
/// is cached or persisted.
async fn get_analytics_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AnalyticsResponse>> {
    let trades = state.db.list_trades(user.id).await?;
    let response = AnalyticsEngine::new().compute(&trades);
    Ok(Json(response))
}

/// Builds the `Set-Cookie` value for the session cookie. A zero max-age
/// clears it.
fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        auth::SESSION_COOKIE,
        token,
        max_age_secs
    )
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run forever until the process is terminated.
pub async fn run(server: ServerSettings, session: SessionSettings, db: Db) -> Result<()> {
    let app_state = AppState {
        db,
        session_ttl: Duration::hours(session.ttl_hours),
    };

    // Sweep expired sessions in the background so the table stays small.
    let sweeper_db = app_state.db.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match sweeper_db.delete_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Swept expired sessions"),
                Err(err) => tracing::warn!(error = %err, "Session sweep failed"),
            }
        }
    });

    let app = create_router(app_state);

    let address = format!("{}:{}", server.host, server.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServerBindError)?;

    Ok(())
}
