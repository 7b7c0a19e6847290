//! JSON-Pointer style references (`doc.json#/definitions/Foo`)

use crate::core::error::{Error, Result};

/// Parsed pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    /// Document part before `#`; `None` for same-document pointers
    pub doc_path: Option<String>,
    /// Unescaped segments of the fragment
    pub segments: Vec<String>,
}

impl JsonPointer {
    /// Parse `[docPath]#fragment` or a bare `/a/b` pointer
    pub fn parse(text: &str) -> Result<Self> {
        let (doc, fragment) = match text.split_once('#') {
            Some((doc, fragment)) => (doc, fragment),
            None => ("", text),
        };

        let fragment = urlencoding::decode(fragment)
            .map_err(|e| Error::InvalidPointer(format!("{}: {}", text, e)))?;

        let segments = if fragment.is_empty() {
            Vec::new()
        } else if let Some(rest) = fragment.strip_prefix('/') {
            rest.split('/')
                .map(unescape_segment)
                .collect::<Result<Vec<_>>>()?
        } else {
            // Plain-name fragment, looked up as a top-level key
            vec![unescape_segment(&fragment)?]
        };

        Ok(Self {
            doc_path: if doc.is_empty() {
                None
            } else {
                Some(doc.to_string())
            },
            segments,
        })
    }

    /// True when the pointer targets the current document
    pub fn is_local(&self) -> bool {
        self.doc_path.is_none()
    }

    /// Absolute path for a tree lookup (leading empty segment = root)
    pub fn local_path(&self) -> Vec<String> {
        let mut path = Vec::with_capacity(self.segments.len() + 1);
        path.push(String::new());
        path.extend(self.segments.iter().cloned());
        path
    }
}

fn unescape_segment(segment: &str) -> Result<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            other => {
                return Err(Error::InvalidPointer(format!(
                    "invalid escape '~{}' in segment '{}'",
                    other.map(String::from).unwrap_or_default(),
                    segment
                )))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_fragment() {
        let p = JsonPointer::parse("#/definitions/Foo").unwrap();
        assert!(p.is_local());
        assert_eq!(p.segments, vec!["definitions", "Foo"]);
        assert_eq!(p.local_path(), vec!["", "definitions", "Foo"]);
    }

    #[test]
    fn test_parse_cross_document() {
        let p = JsonPointer::parse("other.json#/a").unwrap();
        assert_eq!(p.doc_path.as_deref(), Some("other.json"));
        assert!(!p.is_local());
    }

    #[test]
    fn test_unescape() {
        let p = JsonPointer::parse("#/a~1b/c~0d/e%20f").unwrap();
        assert_eq!(p.segments, vec!["a/b", "c~d", "e f"]);
        assert!(JsonPointer::parse("#/bad~2").is_err());
    }
}
