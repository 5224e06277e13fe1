//! Data transfer objects for the file API.

pub mod extract;
pub mod request;
pub mod response;

pub use extract::ApiJson;
pub use request::*;
pub use response::*;
