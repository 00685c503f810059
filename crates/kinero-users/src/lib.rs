//! # Kinero Users
//!
//! User accounts for the Kinero gateway: the [`User`] record that bearer
//! tokens resolve to, an [`InMemoryUserStore`] implementing
//! [`IdentityStore`](kinero_core::IdentityStore), and the [`UserService`]
//! operations behind registration and login.
//!
//! ```
//! use kinero_token::TokenCodec;
//! use kinero_users::{InMemoryUserStore, RegisterRequest, UserService};
//! use std::sync::Arc;
//!
//! let codec = Arc::new(TokenCodec::new("an-example-secret-of-thirty-two-bytes"));
//! let service = UserService::new(InMemoryUserStore::new(), codec);
//!
//! let user = service
//!     .register(RegisterRequest {
//!         email: "ada@kinero.dev".to_string(),
//!         password: "password123".to_string(),
//!     })
//!     .unwrap();
//! assert_eq!(user.email, "ada@kinero.dev");
//! ```

#![doc(html_root_url = "https://docs.rs/kinero-users/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod password;
pub mod service;
pub mod store;

pub use error::{UserError, UserResult, INVALID_CREDENTIALS};
pub use model::{Gender, UnitPreference, User, UserProfile};
pub use password::{Argon2PasswordHasher, PasswordHashError, PasswordHasher};
pub use service::{AuthResponse, LoginRequest, RegisterRequest, UserService, MIN_PASSWORD_LEN};
pub use store::InMemoryUserStore;
