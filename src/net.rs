//! Network layer: single-read payloads, safe dumps, the client wrapper and the
//! buffered response model.

mod client;
mod dump;
mod payload;
mod response;

pub use client::{Client, RequestTimeout};
pub use dump::{dump_request, dump_response, tee_and_restore, ReadOnce};
pub use payload::Payload;
pub use response::Response;

/// A fully materialised request, ready to be dumped or sent.
pub type TransportRequest = http::Request<Payload>;
