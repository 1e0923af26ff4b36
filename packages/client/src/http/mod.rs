//! Request and response descriptors crossing the interception boundary

pub mod request;
pub mod response;

pub use request::InterceptedRequest;
pub use response::{HttpResponse, OFFLINE_JSON_BODY, OFFLINE_TEXT_BODY, ResponseKind};
