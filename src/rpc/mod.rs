pub mod json;
pub mod metadata;
pub mod status;

pub use json::JsonBody;
pub use metadata::bearer_token;
pub use status::{Code, Status};
