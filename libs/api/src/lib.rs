//! # archfx-api
//!
//! REST client for ArchFX Cloud, a Django REST Framework server.
//!
//! ```no_run
//! # async fn run() -> Result<(), archfx_api::ApiError> {
//! use archfx_api::{Api, ApiConfig};
//!
//! let mut api = Api::new(ApiConfig::with_domain("http://127.0.0.1:8000"))?;
//! api.login("user1@test.com", "user1").await?;
//! let orgs = api.resource("org").get().await?;
//! let one = api.resource("org").id("arch").get().await?;
//! api.logout().await?;
//! # let _ = (orgs, one);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod resource;

pub use client::{Api, TokenPayload};
pub use config::{ApiConfig, API_PREFIX, DEFAULT_TOKEN_TYPE, DOMAIN_NAME};
pub use error::ApiError;
pub use resource::Resource;
