//! Business services for the Farm Village server.

pub mod auth;
pub mod checkout;
pub mod tokens;

pub use auth::{AuthError, AuthService, LockoutPolicy};
pub use checkout::{CheckoutError, CheckoutService, OrderLineRequest, OrderRequest, PlacedOrder};
pub use tokens::{TokenError, TokenService};
