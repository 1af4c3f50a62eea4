// actix-web bridge: body extraction and error rendering
pub mod error;
pub mod extract;

pub use error::{handle_json_payload_error, json_config};
pub use extract::Validated;
