//! Golden-vector contract test.
//!
//! A frozen set of canonicalization vectors is part of the public
//! contract: any change to output bytes for any vector here is a
//! breaking change. `evidentia-verify` carries a byte-identical copy of
//! this file (see its own `tests/golden_vectors.rs`) since it must
//! reproduce these bytes without depending on this crate.

use evidentia_canon::{canonical_bytes, payload_hash};
use serde_json::json;

struct Vector {
    name: &'static str,
    input: serde_json::Value,
    expected_bytes: &'static str,
}

fn vectors() -> Vec<Vector> {
    vec![
        Vector {
            name: "empty_object",
            input: json!({}),
            expected_bytes: "{}",
        },
        Vector {
            name: "key_ordering",
            input: json!({"zeta": 1, "alpha": 2, "middle": 3}),
            expected_bytes: r#"{"alpha":2,"middle":3,"zeta":1}"#,
        },
        Vector {
            name: "nested_array_preserves_order",
            input: json!({"seq": [5, 4, 3, 2, 1]}),
            expected_bytes: r#"{"seq":[5,4,3,2,1]}"#,
        },
        Vector {
            name: "integer_without_fraction",
            input: json!({"count": 42.0}),
            expected_bytes: r#"{"count":42}"#,
        },
        Vector {
            name: "booleans_and_null",
            input: json!({"ok": true, "bad": false, "missing": null}),
            expected_bytes: r#"{"bad":false,"missing":null,"ok":true}"#,
        },
        Vector {
            name: "nfc_normalization_of_decomposed_accents",
            input: json!({"name": "cafe\u{0301}"}),
            expected_bytes: "{\"name\":\"caf\u{00e9}\"}",
        },
        Vector {
            name: "redaction_sibling_hash_shape",
            input: json!({"email": "[REDACTED]", "email_hash": "sha256:deadbeef"}),
            expected_bytes: r#"{"email":"[REDACTED]","email_hash":"sha256:deadbeef"}"#,
        },
    ]
}

#[test]
fn golden_vectors_produce_pinned_bytes() {
    for v in vectors() {
        let bytes = canonical_bytes(&v.input).unwrap();
        let got = String::from_utf8(bytes).unwrap();
        assert_eq!(got, v.expected_bytes, "golden vector {} diverged", v.name);
    }
}

#[test]
fn golden_vectors_hash_is_stable_across_runs() {
    for v in vectors() {
        let h1 = payload_hash(&v.input).unwrap();
        let h2 = payload_hash(&v.input).unwrap();
        assert_eq!(h1, h2, "vector {} hash is not deterministic", v.name);
    }
}

#[test]
fn known_payload_hash_pins_sha256_of_empty_object() {
    // sha256("{}") — pinned so a future canonicalizer regression is caught
    // even if the golden bytes above stay accidentally correct.
    let h = payload_hash(&json!({})).unwrap();
    assert_eq!(
        h.to_hex(),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
}
