pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod router;
pub mod store;
pub mod ws;

pub use dispatcher::NotificationDispatcher;
pub use error::NotificationError;
pub use handlers::NotificationState;
pub use registry::{ConnectionRegistry, LiveConnection};
pub use store::{NotificationStore, PostgrestNotificationStore};
