//! # Rental Hex
//!
//! Application service layer and HTTP adapter for the car rental service.
//!
//! ## Architecture
//!
//! - `service/` - Application services (orders, payments, delivery, accounts, catalog)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - OpenAPI document served under `/swagger-ui`
//!
//! Every service is generic over the repository port it needs, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{
    AccountService, CatalogService, DeliveryService, ImportSummary, OrderService, PaymentService,
};
