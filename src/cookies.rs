//! Cookies: the [`Cookie`] value type and its wire and JSON forms.

mod cookie;
mod set_cookie;

pub use cookie::Cookie;
pub use cookie::SameSite;
pub use cookie::{format_cookie_time, parse_cookie_time};
