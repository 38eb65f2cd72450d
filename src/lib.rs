//! # oblio - client for the Oblio invoicing API
//!
//! A blocking Rust client for the Oblio REST API. The client turns a client id
//! and secret into bearer tokens on demand, caches them until shortly before
//! they expire, and re-authenticates once when the API rejects a cached token.
//!
//! ## Features
//!
//! - Transparent token management with a pluggable [`TokenStore`]
//! - Invoices, proformas and notices: create, fetch, cancel, restore, delete
//! - Nomenclature lookups: companies, VAT rates, clients, products, series,
//!   languages, management
//! - Wire types ([`Bool`], [`Int`], [`Date`], [`Timestamp`]) that encode values
//!   the way the API expects and decode every variant it sends back
//! - Per-call deadlines and cancellation through [`CallContext`]
//!
//! ## Basic Usage
//!
//! ```no_run
//! use oblio::{CallContext, Credentials, DocumentRequest, OblioClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OblioClient::new(Credentials::new("you@example.com", "api-secret"))?;
//!     let ctx = CallContext::new();
//!
//!     let invoice = client.get_invoice(&ctx, &DocumentRequest::new("RO37311090", "FCT", "0001"))?;
//!     println!("Invoice total: {}", invoice.data.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom token storage
//!
//! ```no_run
//! use oblio::{Credentials, InMemoryTokenStore, OblioClient};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryTokenStore::new());
//! let client = OblioClient::new(Credentials::new("id", "secret"))?.with_token_store(store);
//! # Ok::<(), oblio::OblioError>(())
//! ```

pub mod auth;
pub mod client;
pub mod context;
pub mod docs;
pub mod error;
pub mod models;
pub mod nomenclature;
pub mod query;
pub mod response;
pub mod rest;
pub mod token;
pub mod wire;

// Re-export main types for convenience
pub use auth::{Credentials, GenerateTokenResponse};
pub use client::Config;
pub use context::CallContext;
pub use docs::{
    CollectRequest, CreateDocumentRequest, CreateInvoiceRequest, CreateNoticeRequest,
    CreateProformaRequest, DocumentKind, DocumentRequest, GetInvoicesRequest,
};
pub use error::{ApiError, OblioError, Result, TransportErrorKind};
pub use nomenclature::{
    CompanyRequest, GetClientsRequest, GetCompaniesRequest, GetProductsRequest,
};
pub use response::Response;
pub use rest::{OblioClient, Payload};
pub use token::{InMemoryTokenStore, TokenStore, TokenStoreError};
pub use wire::{Bool, Date, FormatError, Int, Timestamp, WireValue};

// Re-export the HTTP method type used by `OblioClient::execute`
pub use reqwest::Method;
