//! Request/response sanity layers for axum and tower services.
//!
//! Malformed requests (broken form boundaries, query strings or paths that
//! do not decode as UTF-8) are turned into `400` responses before they reach
//! the application, and non-ASCII redirect locations are percent-encoded on
//! the way out.
//!
//! ```text
//!   request ─▶ ingress checks ─▶ handler ─▶ egress normalization ─▶ response
//!                   │
//!                   └─ SanityError as a 400 response
//! ```

pub mod config;
pub mod egress;
pub mod ingress;
pub mod observability;
pub mod wiring;

pub use config::{ConfigError, FlagValue, SanitySettings};
pub use egress::{egress, EgressLayer, EgressService};
pub use ingress::{ingress, IngressChain, IngressCheck, IngressLayer, IngressService, SanityError};
pub use wiring::{SanityLayer, SanityRouterExt};
