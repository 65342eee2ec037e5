//! Application Layer
//!
//! Client-side state and the session facade that keeps it in step with the API.

pub mod session;
pub mod store;

pub use session::BoardSession;
pub use store::{BoardStore, NoOpListener, SharedStore, StoreError, StoreEvent, StoreListener};
