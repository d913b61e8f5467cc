pub mod body;
pub mod cli;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod net;
pub mod pool;
pub mod render;
pub mod request;
pub mod sniff;

pub use body::Body;
pub use cookies::Cookie;
pub use errors::{Error, Result};
pub use request::RequestConfig;
