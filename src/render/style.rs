/// How the start line of a rendered dump is decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// No escape codes.
    #[default]
    Plain,
    /// Bold white on a 256-colour background.
    Ansi,
}

impl Style {
    /// Decorates an HTTP verb. Unknown verbs are left as they are.
    pub fn method(self, method: &str) -> String {
        self.badge(method, method_color(method))
    }

    /// Decorates a status code (and reason) by status class.
    pub fn status(self, code: u16, text: &str) -> String {
        self.badge(text, status_color(code))
    }

    fn badge(self, text: &str, color: Option<u8>) -> String {
        match (self, color) {
            (Style::Ansi, Some(bg)) => format!("\x1b[1;97;48;5;{bg}m {text} \x1b[0m"),
            _ => text.to_string(),
        }
    }
}

fn method_color(method: &str) -> Option<u8> {
    Some(match method {
        "GET" => 28,
        "POST" => 33,
        "PUT" => 214,
        "PATCH" => 99,
        "DELETE" => 196,
        "HEAD" => 31,
        "OPTIONS" => 112,
        "TRACE" => 244,
        "CONNECT" => 202,
        _ => return None,
    })
}

fn status_color(code: u16) -> Option<u8> {
    Some(match code {
        100..=199 => 244,
        200..=299 => 28,
        300..=399 => 31,
        400..=499 => 214,
        500..=599 => 196,
        _ => return None,
    })
}
