//! # Kinero
//!
//! **Authentication, correlation, and error normalization for the Kinero backend**
//!
//! Kinero wraps request handlers in a fixed pipeline:
//!
//! - 🔗 **Correlation ids** – every request gets one, every response echoes it
//! - 🔒 **Bearer tokens** – HS256 tokens verified against an identity store
//! - 🧯 **Canonical errors** – every failure becomes the same JSON body
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kinero::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_dotenv()?
//!     .with_env_prefix("KINERO")
//!     .load()?;
//!
//! let store = InMemoryUserStore::new();
//! let gateway = Gateway::from_config(config, store.clone())?;
//! gateway.init_telemetry()?;
//! let metrics = gateway.init_metrics()?;
//!
//! let routes = Arc::new(UserRoutes::new(Arc::new(UserService::new(store, gateway.codec()))));
//! let response = gateway
//!     .handle(request, move |ctx, req| routes.dispatch(ctx, req))
//!     .await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Correlation → ErrorNormalization → Authentication → Handler
//!                                                                  ↓
//! Response ← Correlation ← ErrorNormalization ←────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/kinero/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod gateway;
pub mod routes;

pub use gateway::{Gateway, GatewayError};
pub use routes::UserRoutes;

// Re-export core types
pub use kinero_core as core;

// Re-export configuration
pub use kinero_config as config;

// Re-export token types
pub use kinero_token as token;

// Re-export middleware types
pub use kinero_middleware as middleware;

// Re-export telemetry
pub use kinero_telemetry as telemetry;

// Re-export user accounts
pub use kinero_users as users;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use kinero::prelude::*;
/// ```
pub mod prelude {
    pub use crate::gateway::{Gateway, GatewayError};
    pub use crate::routes::UserRoutes;

    pub use kinero_core::{
        AuthenticatedIdentity, CanonicalError, CorrelationId, ErrorKind, IdentityRecord,
        IdentityStore, KineroError, KineroResult, RequestContext, StoreError,
    };

    pub use kinero_config::{ConfigLoader, KineroConfig};

    pub use kinero_token::{IdentityClaim, SignedToken, TokenCodec, TokenError};

    pub use kinero_middleware::{
        BoxFuture, CancellationSignal, MiddlewareContext, MiddlewareResult, Request, Response,
        ResponseExt,
    };

    pub use kinero_users::{InMemoryUserStore, User, UserProfile, UserService};

    pub use http::StatusCode;
    pub use std::sync::Arc;
}
