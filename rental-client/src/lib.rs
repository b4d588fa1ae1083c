//! # Rental Client SDK
//!
//! A typed Rust client for the car rental API.

use rental_types::{
    AddFundsRequest, AttachCardRequest, Car, CarId, CarQuery, CreditCard, LoginRequest,
    LoginResponse, Package, Page, Pickup, RegisterUserRequest, RentalRecord, Reservation,
    SubmitOrderRequest, User,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {kind} - {message}")]
    Api {
        status: u16,
        /// Stable error name from the response body, e.g. `insufficient_funds`
        kind: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The `kind` of an API rejection, if this is one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Api { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

fn api_error(status: u16, body: String) -> ClientError {
    let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(String::from)
    };

    ClientError::Api {
        status,
        kind: field("kind").unwrap_or_else(|| "unknown".to_string()),
        message: field("error").unwrap_or(body),
    }
}

/// Car rental API client.
pub struct RentalClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl RentalClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the session token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users & sessions
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn register(&self, req: &RegisterUserRequest) -> Result<User, ClientError> {
        self.send(self.http.post(self.url("/api/users")).json(req))
            .await
    }

    /// Logs in. The returned token is not stored on this client; build a new
    /// one with [`RentalClient::with_token`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send(self.http.post(self.url("/api/sessions")).json(&req))
            .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send_empty(self.http.delete(self.url("/api/sessions")))
            .await
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.send(self.http.get(self.url("/api/users/me"))).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_packages(&self) -> Result<Vec<Package>, ClientError> {
        self.send(self.http.get(self.url("/api/packages"))).await
    }

    pub async fn list_cars(&self, query: &CarQuery) -> Result<Page<Car>, ClientError> {
        self.send(self.http.get(self.url("/api/cars")).query(query))
            .await
    }

    pub async fn get_car(&self, id: CarId) -> Result<Car, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/cars/{}", id))))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credit card
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn attach_card(&self, req: &AttachCardRequest) -> Result<CreditCard, ClientError> {
        self.send(self.http.post(self.url("/api/card")).json(req))
            .await
    }

    pub async fn get_card(&self) -> Result<CreditCard, ClientError> {
        self.send(self.http.get(self.url("/api/card"))).await
    }

    /// Tops up the card by `amount` minor units.
    pub async fn add_funds(&self, amount: i64) -> Result<CreditCard, ClientError> {
        let req = AddFundsRequest { amount };
        self.send(self.http.post(self.url("/api/card/funds")).json(&req))
            .await
    }

    pub async fn remove_card(&self) -> Result<(), ClientError> {
        self.send_empty(self.http.delete(self.url("/api/card")))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders & rentals
    // ─────────────────────────────────────────────────────────────────────────

    /// Pays for `hours` of `package` and returns the reservation.
    pub async fn submit_order(&self, package: &str, hours: i32) -> Result<Reservation, ClientError> {
        let req = SubmitOrderRequest {
            package: package.to_string(),
            hours,
        };
        self.send(self.http.post(self.url("/api/orders")).json(&req))
            .await
    }

    pub async fn reservation(&self) -> Result<Reservation, ClientError> {
        self.send(self.http.get(self.url("/api/reservation"))).await
    }

    pub async fn pick_up(&self, car_id: CarId) -> Result<Pickup, ClientError> {
        self.send(
            self.http
                .post(self.url(&format!("/api/cars/{}/pickup", car_id))),
        )
        .await
    }

    pub async fn list_rentals(&self) -> Result<Vec<RentalRecord>, ClientError> {
        self.send(self.http.get(self.url("/api/rentals"))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(api_error(status.as_u16(), body))
        }
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(api_error(status.as_u16(), body))
        }
    }
}
