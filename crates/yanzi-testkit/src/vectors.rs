//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the exact preimage and SHA-256 of representative
//! records. Any implementation of the intent hash must reproduce them byte
//! for byte; a failure here means stored hashes would no longer verify.

use yanzi_core::{canonical_preimage, hash_intent, IntentRecord, RawMeta};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub description: &'static str,

    // Inputs, exactly as a caller would supply them.
    pub id: &'static str,
    pub created_at: &'static str,
    pub author: &'static str,
    pub source_type: &'static str,
    pub title: Option<&'static str>,
    pub prompt: &'static str,
    pub response: &'static str,
    pub meta: Option<&'static str>,
    pub prev_hash: Option<&'static str>,

    /// Expected canonical preimage.
    pub expected_preimage: &'static str,
    /// Expected lowercase hex SHA-256 of the preimage.
    pub expected_hash: &'static str,
}

impl GoldenVector {
    /// Build the unsealed record described by this vector.
    pub fn record(&self) -> IntentRecord {
        IntentRecord {
            id: self.id.to_owned(),
            created_at: self.created_at.to_owned(),
            author: self.author.to_owned(),
            source_type: self.source_type.to_owned(),
            title: self.title.map(str::to_owned),
            prompt: self.prompt.to_owned(),
            response: self.response.to_owned(),
            meta: self.meta.map(RawMeta::from),
            prev_hash: self.prev_hash.map(str::to_owned),
            hash: String::new(),
        }
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "minimal",
            description: "Only required fields",
            id: "x",
            created_at: "2026-02-09T10:00:00Z",
            author: "a",
            source_type: "cli",
            title: None,
            prompt: "p",
            response: "r",
            meta: None,
            prev_hash: None,
            expected_preimage: "{\"id\":\"x\",\"created_at\":\"2026-02-09T10:00:00Z\",\"author\":\"a\",\"source_type\":\"cli\",\"prompt\":\"p\",\"response\":\"r\"}",
            expected_hash: "5b1974ffea1ff80bfb73c98a1db437a2421ed142c4ecf6f9925da9cbb839a630",
        },
        GoldenVector {
            name: "full",
            description: "Every optional field, offset timestamp, CRLF text, unsorted metadata",
            id: "01HZYFQ7T9ZV54X2G4A8M4J2C1",
            created_at: "2026-02-09T12:30:00.120+02:30",
            author: "alice",
            source_type: "cli",
            title: Some("hello"),
            prompt: "line1\r\nline2",
            response: "resp\rline2",
            meta: Some("{\"b\": 2, \"a\": 1.50, \"nested\": {\"z\": true, \"y\": null}}"),
            prev_hash: Some("abababababababababababababababababababababababababababababababab"),
            expected_preimage: "{\"id\":\"01HZYFQ7T9ZV54X2G4A8M4J2C1\",\"created_at\":\"2026-02-09T10:00:00.12Z\",\"author\":\"alice\",\"source_type\":\"cli\",\"title\":\"hello\",\"prompt\":\"line1\\nline2\",\"response\":\"resp\\nline2\",\"meta\":{\"a\":1.5,\"b\":2,\"nested\":{\"y\":null,\"z\":true}},\"prev_hash\":\"abababababababababababababababababababababababababababababababab\"}",
            expected_hash: "cc29f07f5b6bdd065ae9ee6967113a0ef291a86a82c2f7284f72ee0a3b488295",
        },
        GoldenVector {
            name: "escaping",
            description: "HTML-sensitive characters, controls, and line separators",
            id: "esc-1",
            created_at: "2026-02-09T10:00:00Z",
            author: "bob",
            source_type: "api",
            title: None,
            prompt: "<b>\"bold\"</b> & tab\there",
            response: "caf\u{e9} \u{2028} end\u{1}",
            meta: Some("{\"html\":\"<a href=\\\"x\\\">&</a>\",\"list\":[\"\\u2029\",1]}"),
            prev_hash: None,
            expected_preimage: "{\"id\":\"esc-1\",\"created_at\":\"2026-02-09T10:00:00Z\",\"author\":\"bob\",\"source_type\":\"api\",\"prompt\":\"\\u003cb\\u003e\\\"bold\\\"\\u003c/b\\u003e \\u0026 tab\\there\",\"response\":\"caf\u{e9} \\u2028 end\\u0001\",\"meta\":{\"html\":\"\\u003ca href=\\\"x\\\"\\u003e\\u0026\\u003c/a\\u003e\",\"list\":[\"\\u2029\",1]}}",
            expected_hash: "c901aedf595d3d20ee5be461f82261df395a3a683220a559e577ce757f96a3f0",
        },
        GoldenVector {
            name: "numbers",
            description: "Numeric spellings collapse to one canonical form",
            id: "num-1",
            created_at: "2025-12-31T23:59:59.999999999-05:00",
            author: "carol",
            source_type: "cli",
            title: None,
            prompt: "p",
            response: "r",
            meta: Some("{\"small\":1e-7,\"big\":1E21,\"neg\":-0.0,\"int\":100e-2,\"prec\":0.30000000000000000000001,\"exp\":12.5e3}"),
            prev_hash: None,
            expected_preimage: "{\"id\":\"num-1\",\"created_at\":\"2026-01-01T04:59:59.999999999Z\",\"author\":\"carol\",\"source_type\":\"cli\",\"prompt\":\"p\",\"response\":\"r\",\"meta\":{\"big\":1e+21,\"exp\":12500,\"int\":1,\"neg\":0,\"prec\":0.30000000000000000000001,\"small\":1e-7}}",
            expected_hash: "a9e777b8f5a9a73637493092b0295757bfa6f26e53f6dc6a0182715fa8ac7452",
        },
    ]
}

/// Check one vector. Returns a description of the first mismatch.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let record = vector.record();

    let preimage = canonical_preimage(&record).map_err(|e| format!("{}: {e}", vector.name))?;
    if preimage != vector.expected_preimage {
        return Err(format!(
            "{}: preimage mismatch\n  expected: {}\n  got:      {}",
            vector.name, vector.expected_preimage, preimage
        ));
    }

    let hash = hash_intent(&record).map_err(|e| format!("{}: {e}", vector.name))?;
    if hash != vector.expected_hash {
        return Err(format!(
            "{}: hash mismatch\n  expected: {}\n  got:      {}",
            vector.name, vector.expected_hash, hash
        ));
    }

    Ok(())
}

/// Verify all golden vectors, collecting every failure.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let errors: Vec<String> = all_vectors()
        .iter()
        .filter_map(|v| verify_vector(v).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_verify() {
        if let Err(errors) = verify_all_vectors() {
            panic!("golden vector failures:\n{}", errors.join("\n"));
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }

    #[test]
    fn test_sealed_vectors_verify() {
        for vector in all_vectors() {
            let sealed = vector.record().seal().unwrap();
            assert_eq!(sealed.hash, vector.expected_hash, "{}", vector.name);
            assert!(sealed.verify_hash().unwrap(), "{}", vector.name);
        }
    }
}
