pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::{create_router, start_api_server};
pub use state::AppState;
