//! Version-manager API types
//!
//! Defines the JSON body posted to the viewer version-manager when a build
//! becomes available, the response it returns, and the day-scoped auth token
//! that accompanies every request.

pub mod request;
pub mod response;
pub mod token;

pub use request::BuildNotification;
pub use response::{interpret_response, ApiResponse, ResponseError, RESULT_SUCCESS};
pub use token::{auth_token, auth_token_for_today};
