pub mod gate;
pub mod handlers;
pub mod session;

pub use gate::{AuthGate, AuthenticatedAccount, AuthorizationError};
