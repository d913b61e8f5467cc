use std::fs::File;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::body::{Body, FormBody, MultipartBuilder};
use crate::errors::{Error, Result};

/// Declarative body as found in a JSON request file.
///
/// `type` selects the variant:
/// - `content`: `text` or `file`, content type sniffed
/// - `form`: `form_data` map
/// - `multipart`: non-empty `multipart_fields`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodySchema {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<IndexMap<String, Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipart_fields: Option<Vec<MultipartField>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultipartField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl BodySchema {
    /// Builds the body this schema describes. Files are read here.
    pub fn parse(&self) -> Result<Body> {
        match self.kind.as_str() {
            "content" => match (&self.text, &self.file) {
                (Some(text), _) => Ok(Body::generic(text.clone().into_bytes(), None)),
                (None, Some(path)) => Body::from_file(path, None),
                (None, None) => Err(Error::MissingContent("content")),
            },
            "form" => match &self.form_data {
                Some(map) => Ok(Body::Form(FormBody::from(map.clone()))),
                None => Err(Error::MissingContent("form")),
            },
            "multipart" => {
                let fields = match &self.multipart_fields {
                    Some(fields) if !fields.is_empty() => fields,
                    _ => return Err(Error::MissingContent("multipart")),
                };
                let mut mp = MultipartBuilder::new();
                for field in fields {
                    field.write_to(&mut mp)?;
                }
                Ok(Body::Multipart(mp))
            }
            other => Err(Error::UnknownBodyType(other.to_string())),
        }
    }
}

impl MultipartField {
    fn write_to(&self, mp: &mut MultipartBuilder) -> Result<()> {
        if self.text.is_none() && self.file.is_none() {
            return Err(Error::InvalidBody(format!("multipart field {:?} has neither text nor file", self.name)));
        }
        if let Some(text) = &self.text {
            mp.add_text_field(&self.name, text)?;
        }
        if let Some(path) = &self.file {
            let f = File::open(path).map_err(|e| Error::attachment(path, e))?;
            mp.add_file_from_stream(&self.name, &file_name(path), f)?;
        }
        Ok(())
    }
}

/// Final path component, used as the part's `filename`.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn schema(json: &str) -> BodySchema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn content_from_text_is_sniffed() {
        let mut body = schema(r#"{"type":"content","text":"{\"a\":1}"}"#).parse().unwrap();
        assert_eq!(body.content_type(), "application/json");
        let bytes = body.reader().unwrap().into_bytes().unwrap();
        assert_eq!(bytes.as_ref(), br#"{"a":1}"#);
    }

    #[test]
    fn content_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4 fake").unwrap();
        let json = serde_json::json!({"type": "content", "file": f.path()}).to_string();

        let body = schema(&json).parse().unwrap();
        assert_eq!(body.content_type(), "application/pdf");
        assert_eq!(body.length(), Some(13));
    }

    #[test]
    fn missing_content_and_unknown_type() {
        assert!(matches!(schema(r#"{"type":"content"}"#).parse(), Err(Error::MissingContent("content"))));
        assert!(matches!(schema(r#"{"type":"form"}"#).parse(), Err(Error::MissingContent("form"))));
        assert!(matches!(
            schema(r#"{"type":"multipart","multipart_fields":[]}"#).parse(),
            Err(Error::MissingContent("multipart"))
        ));
        assert!(matches!(schema(r#"{"type":"xml","text":"<a/>"}"#).parse(), Err(Error::UnknownBodyType(t)) if t == "xml"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<BodySchema>(r#"{"type":"content","txt":"x"}"#).is_err());
    }

    #[test]
    fn form_keeps_field_order() {
        let mut body = schema(r#"{"type":"form","form_data":{"z":["1"],"a":["2","3"]}}"#).parse().unwrap();
        let bytes = body.reader().unwrap().into_bytes().unwrap();
        assert_eq!(bytes.as_ref(), b"z=1&a=2&a=3");
    }

    #[test]
    fn multipart_fields_become_parts() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"GIF89a....").unwrap();
        let json = serde_json::json!({
            "type": "multipart",
            "multipart_fields": [
                {"name": "title", "text": "cat"},
                {"name": "image", "file": f.path()},
            ]
        })
        .to_string();

        let Body::Multipart(mp) = schema(&json).parse().unwrap() else {
            panic!("expected multipart body");
        };
        assert_eq!(mp.parts().len(), 2);
        assert_eq!(mp.parts()[0].name, "title");
        assert_eq!(mp.parts()[1].content_type.as_deref(), Some("image/gif"));
        assert_eq!(mp.parts()[1].filename.as_deref(), Some(file_name(f.path()).as_str()));
    }

    #[test]
    fn multipart_field_without_value_is_invalid() {
        let err = schema(r#"{"type":"multipart","multipart_fields":[{"name":"x"}]}"#).parse().unwrap_err();
        assert!(matches!(err, Error::InvalidBody(_)));
    }

    #[test]
    fn unreadable_attachment_names_the_path() {
        let err = schema(r#"{"type":"content","file":"/definitely/not/here.bin"}"#).parse().unwrap_err();
        match err {
            Error::Attachment { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.bin")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
