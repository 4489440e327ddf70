//! Line-ending normalization for free-text fields.

use std::borrow::Cow;

use crate::record::IntentRecord;

/// Convert CRLF and lone CR to LF.
///
/// Total and allocation-free when the input has no carriage returns.
pub fn normalize_newlines(value: &str) -> Cow<'_, str> {
    if !value.contains('\r') {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace("\r\n", "\n").replace('\r', "\n"))
}

fn normalize_owned(value: &str) -> String {
    normalize_newlines(value).into_owned()
}

/// Return a copy of `record` with every free-text field normalized.
///
/// `id`, `created_at`, `meta`, and `hash` are copied unchanged.
pub fn normalize_record(record: &IntentRecord) -> IntentRecord {
    IntentRecord {
        id: record.id.clone(),
        created_at: record.created_at.clone(),
        author: normalize_owned(&record.author),
        source_type: normalize_owned(&record.source_type),
        title: record.title.as_deref().map(normalize_owned),
        prompt: normalize_owned(&record.prompt),
        response: normalize_owned(&record.response),
        meta: record.meta.clone(),
        prev_hash: record.prev_hash.as_deref().map(normalize_owned),
        hash: record.hash.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb"), "a\nb");
        assert_eq!(normalize_newlines("a\rb"), "a\nb");
        assert_eq!(normalize_newlines("a\r\r\nb"), "a\n\nb");
        assert_eq!(normalize_newlines("a\n\rb"), "a\n\nb");
        assert_eq!(normalize_newlines(""), "");
    }

    #[test]
    fn test_normalize_borrows_clean_input() {
        assert!(matches!(normalize_newlines("line1\nline2"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_normalize_record_fields() {
        let record = IntentRecord {
            id: "id\r\n".into(),
            created_at: "2026-02-09T10:00:00Z".into(),
            author: "alice\r\nline2".into(),
            source_type: "cli\rline2".into(),
            title: Some("title\r\nline2".into()),
            prompt: "prompt\rline2".into(),
            response: "resp\r\nline2".into(),
            meta: None,
            prev_hash: Some("prev\rline2".into()),
            hash: String::new(),
        };

        let normalized = record.normalize();
        assert_eq!(normalized.author, "alice\nline2");
        assert_eq!(normalized.source_type, "cli\nline2");
        assert_eq!(normalized.title.as_deref(), Some("title\nline2"));
        assert_eq!(normalized.prompt, "prompt\nline2");
        assert_eq!(normalized.response, "resp\nline2");
        assert_eq!(normalized.prev_hash.as_deref(), Some("prev\nline2"));
        // Identity fields are not free text.
        assert_eq!(normalized.id, "id\r\n");
    }
}
