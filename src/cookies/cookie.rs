//! Cookie core type.
//!
//! A [`Cookie`] carries the full RFC 6265 attribute set. On the request side only
//! `name=value` goes on the wire; the other attributes are kept so a request file
//! round-trips, and so cookies can be rebuilt from `Set-Cookie` response headers.
//!
//! The JSON form writes `expires` in the fixed GMT form used by HTTP dates
//! (`Wed, 01 Jan 2025 00:00:00 GMT`) and writes `null` when there is no expiry.
//! `same_site` is one of `""`, `"Lax"`, `"Strict"` or `"None"`.
//!
//! ```rust
//! use courier::cookies::{Cookie, SameSite};
//!
//! let c = Cookie {
//!     domain: "example.com".into(),
//!     path: "/".into(),
//!     secure: true,
//!     same_site: SameSite::Lax,
//!     ..Cookie::new("session", "abc123")
//! };
//! assert_eq!(c.pair(), "session=abc123");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Formats a timestamp in the fixed GMT form used by `Expires`.
pub fn format_cookie_time(t: OffsetDateTime) -> String {
    let fmt = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    t.to_offset(UtcOffset::UTC).format(fmt).unwrap_or_default()
}

/// Parses an `Expires` timestamp. Accepts the standard form and the older
/// dash separated one still sent by some servers.
pub fn parse_cookie_time(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    let standard = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let dashed = format_description!(
        "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
    );
    PrimitiveDateTime::parse(s, standard)
        .or_else(|_| PrimitiveDateTime::parse(s, dashed))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// SameSite policy. `Default` means the attribute is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SameSite {
    #[default]
    Default,
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Default => "",
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == SameSite::Default
    }

    /// Case-insensitive match used for `Set-Cookie` headers. Unknown values map to `Default`.
    pub fn from_header_value(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("lax") {
            SameSite::Lax
        } else if s.eq_ignore_ascii_case("strict") {
            SameSite::Strict
        } else if s.eq_ignore_ascii_case("none") {
            SameSite::None
        } else {
            SameSite::Default
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(SameSite::Default),
            "Lax" => Ok(SameSite::Lax),
            "Strict" => Ok(SameSite::Strict),
            "None" => Ok(SameSite::None),
            other => Err(format!("unknown same_site value {other:?}")),
        }
    }
}

impl Serialize for SameSite {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SameSite {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An HTTP cookie with its full attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Domain scoping; empty means host-only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,

    /// Expiration timestamp. Session cookies have `None`.
    #[serde(default, with = "expires_format")]
    pub expires: Option<OffsetDateTime>,

    /// If `true`, the cookie is hidden from client-side scripts.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub http_only: bool,

    /// Lifetime in seconds. Zero or negative asks the client to drop the cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partitioned: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "SameSite::is_default")]
    pub same_site: SameSite,

    /// If `true`, the cookie is sent only over HTTPS.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secure: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), ..Default::default() }
    }

    /// The `name=value` pair sent in a `Cookie` request header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Serializes the cookie as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let mut out = self.pair();
        if !self.path.is_empty() {
            out.push_str("; Path=");
            out.push_str(&self.path);
        }
        if !self.domain.is_empty() {
            out.push_str("; Domain=");
            out.push_str(&self.domain);
        }
        if let Some(expires) = self.expires {
            out.push_str("; Expires=");
            out.push_str(&format_cookie_time(expires));
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if !self.same_site.is_default() {
            out.push_str("; SameSite=");
            out.push_str(self.same_site.as_str());
        }
        if self.partitioned {
            out.push_str("; Partitioned");
        }
        out
    }
}

mod expires_format {
    use super::{format_cookie_time, parse_cookie_time};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(t: &Option<OffsetDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&format_cookie_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<OffsetDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(s) => parse_cookie_time(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid expires timestamp {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn full_cookie() -> Cookie {
        Cookie {
            name: "foo".into(),
            value: "bar".into(),
            domain: "example.com".into(),
            expires: Some(datetime!(2025-01-01 0:00 UTC)),
            http_only: true,
            max_age: Some(42),
            partitioned: true,
            path: "/".into(),
            same_site: SameSite::Lax,
            secure: true,
        }
    }

    #[test]
    fn json_round_trip_full() {
        let c = full_cookie();
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains(r#""expires":"Wed, 01 Jan 2025 00:00:00 GMT""#), "{json}");

        let back: Cookie = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn json_round_trip_optional_fields() {
        let variants = [
            Cookie::new("a", "1"),
            Cookie { max_age: Some(0), ..Cookie::new("a", "1") },
            Cookie { max_age: Some(-1), ..Cookie::new("a", "1") },
            Cookie { same_site: SameSite::None, secure: true, ..Cookie::new("a", "1") },
            Cookie { same_site: SameSite::Strict, ..Cookie::new("a", "1") },
            Cookie { expires: Some(datetime!(1999-12-31 23:59:59 UTC)), ..Cookie::new("a", "1") },
        ];
        for c in variants {
            let json = serde_json::to_string(&c).unwrap();
            let back: Cookie = serde_json::from_str(&json).unwrap();
            assert_eq!(back, c, "round trip of {json}");
        }
    }

    #[test]
    fn missing_expiry_is_null() {
        let json = serde_json::to_value(Cookie::new("a", "1")).unwrap();
        assert!(json["expires"].is_null());

        let c: Cookie = serde_json::from_str(r#"{"name":"a","value":"1","expires":null}"#).unwrap();
        assert_eq!(c.expires, None);
    }

    #[test]
    fn expiry_is_written_in_gmt() {
        let t = datetime!(2025-01-01 2:00 +2);
        assert_eq!(format_cookie_time(t), "Wed, 01 Jan 2025 00:00:00 GMT");
        assert_eq!(parse_cookie_time("Wed, 01-Jan-2025 00:00:00 GMT"), Some(datetime!(2025-01-01 0:00 UTC)));
    }

    #[test]
    fn same_site_is_a_bijection() {
        for s in [SameSite::Default, SameSite::Lax, SameSite::Strict, SameSite::None] {
            assert_eq!(s.to_string().parse::<SameSite>().unwrap(), s);
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(serde_json::from_str::<SameSite>(&json).unwrap(), s);
        }
        assert!("lax".parse::<SameSite>().is_err());
    }

    #[test]
    fn set_cookie_form() {
        assert_eq!(
            full_cookie().to_set_cookie(),
            "foo=bar; Path=/; Domain=example.com; Expires=Wed, 01 Jan 2025 00:00:00 GMT; Max-Age=42; HttpOnly; Secure; SameSite=Lax; Partitioned"
        );
    }
}
