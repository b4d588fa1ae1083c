//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rental_types::domain::{
    Car, CarId, CreditCard, CreditCardId, Money, Package, PackageId, Pickup, RentalId,
    RentalRecord, Reservation, ReservationId, User, UserId,
};
use rental_types::dto::{
    AddFundsRequest, AttachCardRequest, CarQuery, CarSort, LoginRequest, LoginResponse, Page,
    RegisterUserRequest, SortDirection, SubmitOrderRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid username, email or password"),
        (status = 409, description = "Username already taken")
    )
)]
async fn register() {}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Session opened; the token is shown only once", body = LoginResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
async fn login() {}

/// Log out (ends the session of the presented token)
#[utoipa::path(
    delete,
    path = "/api/sessions",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn logout() {}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized")
    )
)]
async fn me() {}

/// List packages, cheapest first
#[utoipa::path(
    get,
    path = "/api/packages",
    tag = "catalog",
    responses(
        (status = 200, description = "All packages", body = Vec<Package>)
    )
)]
async fn list_packages() {}

/// List cars with pagination, sorting and filters
#[utoipa::path(
    get,
    path = "/api/cars",
    tag = "catalog",
    params(CarQuery),
    responses(
        (status = 200, description = "One page of cars", body = Page<Car>),
        (status = 400, description = "Invalid page size")
    )
)]
async fn list_cars() {}

/// Get a car by ID
#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    tag = "catalog",
    params(
        ("id" = i64, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Car found", body = Car),
        (status = 400, description = "Invalid car ID"),
        (status = 404, description = "Car not found")
    )
)]
async fn get_car() {}

/// Pick up a car with the active reservation
#[utoipa::path(
    post,
    path = "/api/cars/{id}/pickup",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Car ID")
    ),
    responses(
        (status = 201, description = "Car handed out, rental started", body = Pickup),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Car belongs to a different package than the reservation"),
        (status = 404, description = "No reservation or car not found"),
        (status = 409, description = "Car is not available")
    )
)]
async fn pick_up() {}

/// Attach a credit card
#[utoipa::path(
    post,
    path = "/api/card",
    tag = "card",
    request_body = AttachCardRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Card attached with a zero balance", body = CreditCard),
        (status = 400, description = "Invalid card details"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Card number in use, or a card is already attached")
    )
)]
async fn attach_card() {}

/// Show the attached credit card
#[utoipa::path(
    get,
    path = "/api/card",
    tag = "card",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attached card", body = CreditCard),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No credit card attached")
    )
)]
async fn get_card() {}

/// Remove the attached credit card
#[utoipa::path(
    delete,
    path = "/api/card",
    tag = "card",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Card removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No credit card attached")
    )
)]
async fn remove_card() {}

/// Top up the attached credit card
#[utoipa::path(
    post,
    path = "/api/card/funds",
    tag = "card",
    request_body = AddFundsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card with the new balance", body = CreditCard),
        (status = 400, description = "Amount must be positive"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No credit card attached")
    )
)]
async fn add_funds() {}

/// Pay for a package and receive a reservation
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "rentals",
    request_body = SubmitOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Card charged, reservation issued", body = Reservation),
        (status = 400, description = "Invalid hours or insufficient funds"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown package or no credit card"),
        (status = 409, description = "A reservation is already active")
    )
)]
async fn submit_order() {}

/// Show the active reservation
#[utoipa::path(
    get,
    path = "/api/reservation",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active reservation", body = Reservation),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No active reservation")
    )
)]
async fn get_reservation() {}

/// Rental history, newest first
#[utoipa::path(
    get,
    path = "/api/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Completed pickups", body = Vec<RentalRecord>),
        (status = 401, description = "Unauthorized")
    )
)]
async fn list_rentals() {}

/// OpenAPI documentation for the rental API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Car Rental Service API",
        version = "1.0.0",
        description = "Reserve a car from a priced package, pay for it from a stored-value credit card, then pick up a matching car.\n\n## Authentication\n\nRegister with `POST /api/users`, log in with `POST /api/sessions`, then send the returned token in the `Authorization` header:\n\n```\nAuthorization: Bearer rt_your_token_here\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        register,
        login,
        logout,
        me,
        list_packages,
        list_cars,
        get_car,
        pick_up,
        attach_card,
        get_card,
        remove_card,
        add_funds,
        submit_order,
        get_reservation,
        list_rentals,
    ),
    components(
        schemas(
            RegisterUserRequest,
            LoginRequest,
            LoginResponse,
            AttachCardRequest,
            AddFundsRequest,
            SubmitOrderRequest,
            CarSort,
            SortDirection,
            User,
            CreditCard,
            Package,
            Car,
            Reservation,
            RentalRecord,
            Pickup,
            Money,
            UserId,
            CreditCardId,
            PackageId,
            CarId,
            ReservationId,
            RentalId,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Registration and login sessions"),
        (name = "catalog", description = "Packages and cars"),
        (name = "card", description = "Stored-value credit card"),
        (name = "rentals", description = "Orders, reservations and pickups"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
