pub mod auth;
pub mod logging;
pub mod request_id;

pub use auth::{bearer_token, require_auth};
pub use logging::log_error_responses;
pub use request_id::{request_id, RequestId};
