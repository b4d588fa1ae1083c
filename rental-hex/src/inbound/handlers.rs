//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use rental_types::{
    AddFundsRequest, AppError, AttachCardRequest, Caller, CarId, CarQuery, DomainError,
    LoginRequest, RegisterUserRequest, Repository, SubmitOrderRequest,
};

use super::auth::BearerToken;
use crate::{AccountService, CatalogService, DeliveryService, OrderService, PaymentService};

/// Application state shared across handlers.
pub struct AppState<R: Repository> {
    pub accounts: AccountService<R>,
    pub catalog: CatalogService<R>,
    pub orders: OrderService<R>,
    pub payments: PaymentService<R>,
    pub delivery: DeliveryService<R>,
}

impl<R: Repository> AppState<R> {
    /// Wires every service to the same repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            accounts: AccountService::new(repo.clone()),
            catalog: CatalogService::new(repo.clone()),
            orders: OrderService::new(repo.clone()),
            payments: PaymentService::new(repo.clone()),
            delivery: DeliveryService::new(repo),
        }
    }
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(AppError::Rejected(err))
    }
}

/// HTTP status for each business rejection.
fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::ExistingReservation
        | DomainError::CarUnavailable(_)
        | DomainError::DuplicateCard
        | DomainError::CardAlreadyAttached
        | DomainError::UsernameTaken(_) => StatusCode::CONFLICT,
        DomainError::UnknownPackage(_)
        | DomainError::NoCreditCard
        | DomainError::NoReservation
        | DomainError::CarNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InsufficientFunds { .. } | DomainError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::PackageMismatch { .. } => StatusCode::FORBIDDEN,
        DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self.0 {
            AppError::Rejected(e) => (domain_status(e), e.kind(), e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16(),
            "kind": kind
        });

        (status, Json(body)).into_response()
    }
}

fn parse_car_id(id: &str) -> Result<CarId, ApiError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("Invalid car ID".into()).into())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users & sessions
// ─────────────────────────────────────────────────────────────────────────────

pub async fn register<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.accounts.login(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn logout<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(token): Extension<BearerToken>,
) -> Result<impl IntoResponse, ApiError> {
    state.accounts.logout(&token.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.profile(&caller).await?;
    Ok(Json(user))
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_packages<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let packages = state.catalog.list_packages().await?;
    Ok(Json(packages))
}

pub async fn list_cars<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<CarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.catalog.list_cars(query).await?;
    Ok(Json(page))
}

#[tracing::instrument(skip(state))]
pub async fn get_car<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let car = state.catalog.get_car(parse_car_id(&id)?).await?;
    Ok(Json(car))
}

// ─────────────────────────────────────────────────────────────────────────────
// Credit card
// ─────────────────────────────────────────────────────────────────────────────

pub async fn attach_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<AttachCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.payments.attach_card(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.payments.get_card(&caller).await?;
    Ok(Json(card))
}

pub async fn remove_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    state.payments.remove_card(&caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_funds<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<AddFundsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.payments.add_funds(&caller, req.amount).await?;
    Ok(Json(card))
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders & rentals
// ─────────────────────────────────────────────────────────────────────────────

pub async fn submit_order<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reservation = state.orders.submit_order(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn get_reservation<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let reservation = state.orders.current_reservation(&caller).await?;
    Ok(Json(reservation))
}

pub async fn pick_up<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pickup = state.delivery.pick_up(&caller, parse_car_id(&id)?).await?;
    Ok((StatusCode::CREATED, Json(pickup)))
}

pub async fn list_rentals<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let rentals = state.delivery.list_rentals(&caller).await?;
    Ok(Json(rentals))
}
