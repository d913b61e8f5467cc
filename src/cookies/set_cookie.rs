//! `Set-Cookie` header parsing.
//!
//! Attribute names are matched case-insensitively. Handled attributes are
//! `Path`, `Domain` (leading dot stripped), `Expires`, `Max-Age`, `SameSite`,
//! `Secure`, `HttpOnly` and `Partitioned`; anything else is ignored. An
//! unparseable `Expires` or `Max-Age` is dropped rather than failing the cookie.

use http::HeaderMap;

use super::cookie::{parse_cookie_time, Cookie, SameSite};

impl Cookie {
    /// Parses one `Set-Cookie` header value. Returns `None` when there is no
    /// `name=value` pair or the name is empty.
    pub fn parse_set_cookie(line: &str) -> Option<Cookie> {
        let mut parts = line.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));

        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = v.to_string(),
                    "domain" => cookie.domain = v.trim_start_matches('.').to_string(),
                    "expires" => cookie.expires = parse_cookie_time(v),
                    "max-age" => cookie.max_age = v.parse().ok(),
                    "samesite" => cookie.same_site = SameSite::from_header_value(v),
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            } else if part.eq_ignore_ascii_case("partitioned") {
                cookie.partitioned = true;
            }
        }

        Some(cookie)
    }

    /// Rebuilds every cookie found in the `Set-Cookie` headers of a response.
    pub fn from_response_headers(headers: &HeaderMap) -> Vec<Cookie> {
        headers
            .get_all(http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|line| {
                let cookie = Cookie::parse_set_cookie(line);
                if cookie.is_none() {
                    log::debug!("ignoring malformed Set-Cookie header: {line}");
                }
                cookie
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use time::macros::datetime;

    #[test]
    fn parses_full_attribute_set() {
        let c = Cookie::parse_set_cookie(
            "id=a3fWa; Expires=Thu, 21 Oct 2027 07:28:00 GMT; Max-Age=-1; Domain=.example.com; \
             Path=/docs; Secure; HttpOnly; SameSite=strict; Partitioned",
        )
        .unwrap();

        assert_eq!(c.name, "id");
        assert_eq!(c.value, "a3fWa");
        assert_eq!(c.expires, Some(datetime!(2027-10-21 7:28 UTC)));
        assert_eq!(c.max_age, Some(-1));
        assert_eq!(c.domain, "example.com");
        assert_eq!(c.path, "/docs");
        assert!(c.secure && c.http_only && c.partitioned);
        assert_eq!(c.same_site, SameSite::Strict);
    }

    #[test]
    fn set_cookie_text_round_trips() {
        let expiries = [None, Some(datetime!(2030-06-01 12:00 UTC))];
        let max_ages = [None, Some(-1), Some(0), Some(3600)];
        let same_sites = [SameSite::Default, SameSite::Lax, SameSite::Strict, SameSite::None];

        for expires in expiries {
            for max_age in max_ages {
                for same_site in same_sites {
                    for flags in 0..32u8 {
                        let c = Cookie {
                            domain: if flags & 1 == 0 { String::new() } else { "example.com".into() },
                            path: if flags & 2 == 0 { String::new() } else { "/api".into() },
                            expires,
                            max_age,
                            same_site,
                            http_only: flags & 4 != 0,
                            secure: flags & 8 != 0,
                            partitioned: flags & 16 != 0,
                            ..Cookie::new("token", "xyz")
                        };
                        let line = c.to_set_cookie();
                        assert_eq!(Cookie::parse_set_cookie(&line), Some(c), "{line}");
                    }
                }
            }
        }
    }

    #[test]
    fn negative_max_age_is_written_signed() {
        let c = Cookie { max_age: Some(-1), ..Cookie::new("a", "1") };
        assert_eq!(c.to_set_cookie(), "a=1; Max-Age=-1");
        assert_eq!(Cookie::parse_set_cookie("a=1; Max-Age=-1").unwrap().max_age, Some(-1));
    }

    #[test]
    fn rejects_missing_pair() {
        assert!(Cookie::parse_set_cookie("Secure; HttpOnly").is_none());
        assert!(Cookie::parse_set_cookie("=value").is_none());
    }

    #[test]
    fn bad_attributes_are_dropped() {
        let c = Cookie::parse_set_cookie("a=1; Expires=tomorrow; Max-Age=soon; SameSite=weird").unwrap();
        assert_eq!(c.expires, None);
        assert_eq!(c.max_age, None);
        assert_eq!(c.same_site, SameSite::Default);
    }

    #[test]
    fn collects_all_set_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(http::header::SET_COOKIE, HeaderValue::from_static("a=1; Path=/"));
        headers.append(http::header::SET_COOKIE, HeaderValue::from_static("garbage"));
        headers.append(http::header::SET_COOKIE, HeaderValue::from_static("b=2; HttpOnly"));

        let cookies = Cookie::from_response_headers(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].pair(), "a=1");
        assert!(cookies[1].http_only);
    }
}
