use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::error::ConsoleError;

/// Indentation du plain surface (4 espaces, comme le backend)
pub const PLAIN_INDENT: usize = 4;
/// Indentation du rich surface (indentUnit de l'éditeur de code)
pub const RICH_INDENT: usize = 2;

/// Sérialise `value` avec `indent` espaces ; l'ordre des clés est conservé
pub fn pretty<T: Serialize + ?Sized>(value: &T, indent: usize) -> String {
    let pad = vec![b' '; indent];
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&pad));
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Reformate un texte JSON ; un texte non JSON est rendu tel quel
pub fn reformat(text: &str, indent: usize) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => pretty(&value, indent),
        Err(_) => text.to_string(),
    }
}

pub fn validate(text: &str) -> Result<Value, ConsoleError> {
    serde_json::from_str(text).map_err(ConsoleError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_indent() {
        assert_eq!(pretty(&json!({"a": 1}), PLAIN_INDENT), "{\n    \"a\": 1\n}");
        assert_eq!(pretty(&json!({"a": 1}), RICH_INDENT), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_key_order_preserved() {
        let text = reformat(r#"{"zeta":1,"alpha":{"b":2,"a":3}}"#, 2);
        let zeta = text.find("zeta").unwrap();
        let alpha = text.find("alpha").unwrap();
        assert!(zeta < alpha);
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn test_pretty_roundtrip() {
        let docs = [
            json!({}),
            json!([]),
            json!({"nested": {"list": [1, 2.5, -3, null, true], "s": "é\"\\\n"}}),
            json!({"nfq_rules_dir": "/root/nfq/rules", "listenPort": "8080", "big": 18446744073709551615u64}),
            json!("just a string"),
        ];
        for doc in docs {
            for indent in [PLAIN_INDENT, RICH_INDENT] {
                let back: Value = serde_json::from_str(&pretty(&doc, indent)).unwrap();
                assert_eq!(back, doc);
            }
        }
    }

    #[test]
    fn test_reformat_keeps_invalid_text() {
        assert_eq!(reformat("{ not json", 2), "{ not json");
        assert_eq!(reformat("", 2), "");
    }

    #[test]
    fn test_validate() {
        assert!(validate("{\"a\": [1]}").is_ok());
        assert!(matches!(validate("{\"a\": }"), Err(ConsoleError::InvalidJson(_))));
    }
}
