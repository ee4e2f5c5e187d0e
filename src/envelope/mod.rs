//! Command and response envelopes plus the JSON codec between them and
//! raw payloads.
//!
//! Every transport carries the same two shapes:
//!
//! ```json
//! { "command": "CreateActor", "params": { "className": "PointLight" } }
//! { "success": true, "data": { "actorId": "PointLight_0" } }
//! ```

pub mod codec;
pub mod command;
pub mod response;

pub use codec::{decode_command, encode_response};
pub use command::CommandEnvelope;
pub use response::ResponseEnvelope;
