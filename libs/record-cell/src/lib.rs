pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::RecordState;
pub use router::record_routes;
