//! Router, shared state, and HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::auth::{self, SessionUser};
use crate::api::error::ApiError;
use crate::persistence::{self, LeaderboardEntry, PgPool};
use crate::portfolio::{self, Holding, PortfolioSummary};
use crate::trading::{self, TradeError};
use crate::types::instrument::{Instrument, PricePoint};
use crate::types::transaction::{TradeSide, Transaction};
use crate::types::user::User;

/// Shared resources handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub session_ttl_hours: i64,
    pub starting_balance: f64,
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
        .route("/api/stocks", get(list_stocks))
        .route("/api/stocks/{id}", get(get_stock))
        .route("/api/stocks/{id}/history", get(stock_history))
        .route("/api/portfolio", get(get_portfolio))
        .route("/api/portfolio/summary", get(portfolio_summary))
        .route("/api/transactions", get(list_transactions))
        .route("/api/trade", post(trade))
        .route("/api/leaderboard", get(leaderboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// POST /api/register: create a user with the starting balance and log them in.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, CookieJar, Json<User>), ApiError> {
    let username = body.username.trim().to_lowercase();
    if username.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".to_string(),
        ));
    }

    if persistence::get_user_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("Username already taken".to_string()));
    }

    let password_hash = auth::hash_password(&body.password)
        .map_err(|err| ApiError::Internal(format!("password hashing failed: {err}")))?;
    let row = persistence::insert_user(
        &state.pool,
        Uuid::new_v4(),
        &username,
        &password_hash,
        state.starting_balance,
    )
    .await?;
    let session_id =
        persistence::create_session(&state.pool, row.id, state.session_ttl_hours).await?;

    info!(username = %username, "user registered");
    Ok((
        StatusCode::CREATED,
        jar.add(auth::session_cookie(session_id)),
        Json(row.into_user()),
    ))
}

/// POST /api/login. Unknown username and wrong password get the same 401.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let username = body.username.trim().to_lowercase();
    let row = persistence::get_user_by_username(&state.pool, &username)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !auth::verify_password(&body.password, &row.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    if let Err(err) = persistence::sweep_expired(&state.pool).await {
        warn!(%err, "expired session sweep failed");
    }
    let session_id =
        persistence::create_session(&state.pool, row.id, state.session_ttl_hours).await?;

    Ok((
        jar.add(auth::session_cookie(session_id)),
        Json(row.into_user()),
    ))
}

/// POST /api/logout: drop the session row and clear the cookie.
async fn logout(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
) -> Result<CookieJar, ApiError> {
    persistence::delete_session(&state.pool, user.session_id).await?;
    Ok(jar.remove(auth::clear_session_cookie()))
}

/// GET /api/user.
async fn current_user(
    State(state): State<AppState>,
    user: SessionUser,
) -> Result<Json<User>, ApiError> {
    let row = persistence::get_user(&state.pool, user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(row.into_user()))
}

/// GET /api/stocks.
async fn list_stocks(State(state): State<AppState>) -> Result<Json<Vec<Instrument>>, ApiError> {
    let instruments = persistence::list_instruments(&state.pool).await?;
    Ok(Json(instruments))
}

/// GET /api/stocks/{id}.
async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Instrument>, ApiError> {
    let instrument = persistence::get_instrument(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Stock"))?;
    Ok(Json(instrument))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

/// GET /api/stocks/{id}/history, newest first.
async fn stock_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<PricePoint>>, ApiError> {
    let limit = query.limit.unwrap_or(100).max(0);
    let history = persistence::list_price_history(&state.pool, id, limit).await?;
    Ok(Json(history))
}

async fn load_holdings(pool: &PgPool, user_id: Uuid) -> Result<Vec<Holding>, ApiError> {
    let rows = persistence::list_holdings(pool, user_id).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let instrument = row.instrument();
            Holding::from_parts(
                instrument,
                row.quantity,
                row.average_cost,
                row.position_updated_at,
            )
        })
        .collect())
}

/// GET /api/portfolio: positions enriched with instrument and valuation.
async fn get_portfolio(
    State(state): State<AppState>,
    user: SessionUser,
) -> Result<Json<Vec<Holding>>, ApiError> {
    let holdings = load_holdings(&state.pool, user.user_id).await?;
    Ok(Json(holdings))
}

/// GET /api/portfolio/summary.
async fn portfolio_summary(
    State(state): State<AppState>,
    user: SessionUser,
) -> Result<Json<PortfolioSummary>, ApiError> {
    let row = persistence::get_user(&state.pool, user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let holdings = load_holdings(&state.pool, user.user_id).await?;
    Ok(Json(portfolio::summarize(&holdings, row.wallet_balance)))
}

/// Transaction enriched with its instrument for the history listing.
#[derive(Debug, Serialize)]
struct TransactionWithStock {
    #[serde(flatten)]
    transaction: Transaction,
    stock: Instrument,
}

/// GET /api/transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    user: SessionUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TransactionWithStock>>, ApiError> {
    let limit = query.limit.unwrap_or(10).max(0);
    let rows = persistence::list_transactions_for_user(&state.pool, user.user_id, limit).await?;
    let enriched = rows
        .iter()
        .filter_map(|row| {
            row.transaction().map(|transaction| TransactionWithStock {
                transaction,
                stock: row.instrument(),
            })
        })
        .collect();
    Ok(Json(enriched))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeRequest {
    stock_id: Uuid,
    #[serde(rename = "type")]
    trade_type: String,
    quantity: i64,
    price: f64,
}

/// POST /api/trade: validate the order shape, then settle atomically.
async fn trade(
    State(state): State<AppState>,
    user: SessionUser,
    Json(body): Json<TradeRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let side = TradeSide::from_str(&body.trade_type).ok_or(TradeError::InvalidTradeType)?;
    if body.quantity <= 0 {
        return Err(ApiError::Validation("quantity must be positive".to_string()));
    }
    if !body.price.is_finite() || body.price <= 0.0 {
        return Err(ApiError::Validation("price must be positive".to_string()));
    }

    let transaction = trading::execute_trade(
        &state.pool,
        user.user_id,
        body.stock_id,
        side,
        body.quantity,
        body.price,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /api/leaderboard.
async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(10).max(0);
    let entries = persistence::get_leaderboard(&state.pool, limit).await?;
    Ok(Json(entries))
}
