mod error;
mod extract;
mod handlers;
mod router;
mod types;

pub use error::ApiError;
pub use router::{app, router};
pub use types::AppState;
