//! Command line surface.
//!
//! [`Cli`] is parsed by `clap`; [`Cli::to_request`] turns it into a
//! [`RequestConfig`] and [`run::execute`] does the rest.

pub mod attach;
pub mod run;

use std::path::PathBuf;

use clap::Parser;

use crate::body::Body;
use crate::config::{OptionOverrides, Switch};
use crate::errors::{Error, Result};
use crate::request::RequestConfig;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "courier", version, about = "Compose, preview and send HTTP requests")]
pub struct Cli {
    /// Target URL
    #[arg(value_name = "URL", required_unless_present = "from_file", conflicts_with = "from_file")]
    pub url: Option<String>,

    /// Read the request from a JSON file
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// HTTP method (default GET, or the method in the request file)
    #[arg(short = 'M', long)]
    pub method: Option<String>,

    /// Header, repeatable: `Key:value[,value...]`
    #[arg(short = 'H', long = "header", value_name = "KEY:VALUES")]
    pub headers: Vec<String>,

    /// Query parameter, repeatable: `key:value[,value...]`
    #[arg(short = 'Q', long = "query", value_name = "KEY:VALUES")]
    pub query: Vec<String>,

    /// Cookie, repeatable: `name:value`
    #[arg(short = 'C', long = "cookie", value_name = "NAME:VALUE")]
    pub cookies: Vec<String>,

    /// Raw body, or `@file`
    #[arg(long, group = "attachment")]
    pub data: Option<String>,

    /// JSON body, or `@file`
    #[arg(long, group = "attachment")]
    pub json: Option<String>,

    /// URL-encoded form field, repeatable: `key=value` or `key=@file`
    #[arg(long, group = "attachment", value_name = "KEY=VALUE")]
    pub form: Vec<String>,

    /// Multipart field, repeatable: `key=value`, `key=@file` or `key=<@file`
    #[arg(long, group = "attachment", value_name = "KEY=VALUE")]
    pub part: Vec<String>,

    /// Debug logging
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub verbose: Option<bool>,

    /// Send the request (`--send-request=false` previews only)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub send_request: Option<bool>,

    /// Print the request before sending it
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub dump_request: Option<bool>,

    /// Print the response as a tree instead of its body
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub dump_response: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub sanitize_query: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub sanitize_headers: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub sanitize_cookies: Option<bool>,

    /// Request timeout in seconds, 0 for the client default
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Flags that were actually given.
    pub fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            verbose: Switch::from(self.verbose),
            send_request: Switch::from(self.send_request),
            dump_request: Switch::from(self.dump_request),
            dump_response: Switch::from(self.dump_response),
            sanitize_query: Switch::from(self.sanitize_query),
            sanitize_headers: Switch::from(self.sanitize_headers),
            sanitize_cookies: Switch::from(self.sanitize_cookies),
            timeout: self.timeout,
        }
    }

    /// Builds the request configuration: file or URL first, then option
    /// overrides, then flags, then the body.
    pub fn to_request(&self) -> Result<RequestConfig> {
        let mut cfg = match (&self.from_file, &self.url) {
            (Some(path), _) => RequestConfig::from_file(path)?,
            (None, Some(url)) => RequestConfig::new(url)?,
            (None, None) => return Err(Error::invalid_url("", "no URL or request file given")),
        };
        self.overrides().apply(&mut cfg.options);

        if let Some(method) = &self.method {
            cfg.method = method.clone();
        }
        for (k, vs) in attach::parse_key_values(&self.headers)? {
            cfg.add_header(k, vs);
        }
        for (k, vs) in attach::parse_key_values(&self.query)? {
            cfg.add_query_param(k, vs);
        }
        for (name, value) in attach::parse_cookies(&self.cookies)? {
            cfg.add_cookie(name, value);
        }
        if let Some(body) = self.attachment()? {
            cfg.set_body(body);
        }
        Ok(cfg)
    }

    fn attachment(&self) -> Result<Option<Body>> {
        if let Some(data) = &self.data {
            return attach::data(data).map(Some);
        }
        if let Some(json) = &self.json {
            return attach::json(json).map(Some);
        }
        if !self.form.is_empty() {
            return attach::form(&self.form).map(Some);
        }
        if !self.part.is_empty() {
            return attach::parts(&self.part).map(Some);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_build_a_request() {
        let cli = Cli::try_parse_from([
            "courier",
            "https://example.com/api?x=1",
            "-M",
            "patch",
            "-H",
            "Accept:application/json",
            "-Q",
            "y:2,3",
            "-C",
            "sid:42",
            "--json",
            "{\"k\":true}",
            "--dump-request",
            "--send-request=false",
        ])
        .unwrap();

        let cfg = cli.to_request().unwrap();
        assert_eq!(cfg.method, "patch");
        assert_eq!(cfg.query_params()["x"], vec!["1"]);
        assert_eq!(cfg.query_params()["y"], vec!["2", "3"]);
        assert_eq!(cfg.headers()["Accept"], vec!["application/json"]);
        assert_eq!(cfg.cookies()[0].pair(), "sid=42");
        assert!(cfg.options.dump_request);
        assert!(!cfg.options.send_request);
        assert_eq!(cfg.body().map(|b| b.content_type()), Some("application/json".to_string()));
    }

    #[test]
    fn only_one_attachment_kind() {
        let res = Cli::try_parse_from(["courier", "http://h/", "--data", "x", "--form", "a=1"]);
        assert!(res.is_err());
    }

    #[test]
    fn url_or_file_required() {
        assert!(Cli::try_parse_from(["courier"]).is_err());
    }

    #[test]
    fn flags_override_file_options() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(br#"{"method":"DELETE","url":"http://h/r","options":{"dump_response":true,"timeout":9}}"#)
            .unwrap();
        let path = f.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["courier", "--from-file", &path, "--dump-response=false"]).unwrap();
        let cfg = cli.to_request().unwrap();
        assert_eq!(cfg.method, "DELETE");
        assert!(!cfg.options.dump_response);
        assert_eq!(cfg.options.timeout, 9);
    }

    #[test]
    fn sanitize_flags_apply_before_headers() {
        let cli = Cli::try_parse_from(["courier", "http://h/", "--sanitize-cookies=false", "-C", "empty:"]).unwrap();
        let cfg = cli.to_request().unwrap();
        assert_eq!(cfg.cookies().len(), 1);

        let cli = Cli::try_parse_from(["courier", "http://h/", "-C", "empty:"]).unwrap();
        assert!(cli.to_request().unwrap().cookies().is_empty());
    }
}
