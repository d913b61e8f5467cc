use indexmap::IndexMap;
use url::form_urlencoded;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// URL-encoded form fields.
///
/// Keys keep the order they were first added in; repeated values for one key
/// are encoded as repeated `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: IndexMap<String, Vec<String>>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    pub fn fields(&self) -> &IndexMap<String, Vec<String>> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Percent-encodes the fields. Pure, so it is recomputed on every read.
    pub fn encode(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.fields {
            for value in values {
                ser.append_pair(key, value);
            }
        }
        ser.finish()
    }
}

impl From<IndexMap<String, Vec<String>>> for FormBody {
    fn from(fields: IndexMap<String, Vec<String>>) -> Self {
        Self { fields }
    }
}
