use crate::error::{OteError, Result};
use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;

/// True for JSON media types, including `+json` suffixes
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = essence(media_type);
    essence == "application/json" || essence.ends_with("+json")
}

/// True for media types whose payload is text
pub fn is_text_media_type(media_type: &str) -> bool {
    let essence = essence(media_type);
    essence.starts_with("text/")
        || matches!(
            essence.as_str(),
            "application/xml" | "application/csv" | "application/yaml"
        )
}

fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Decode downloaded bytes into a session value according to their media type.
///
/// JSON becomes the parsed value, text becomes a string and anything else a
/// `data:` URL with base64 content.
pub fn decode(bytes: &[u8], media_type: &str) -> Result<Value> {
    if is_json_media_type(media_type) {
        return serde_json::from_slice(bytes).map_err(|e| {
            OteError::plugin(format!("content is not valid JSON for {media_type}: {e}"))
        });
    }

    if is_text_media_type(media_type) {
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| OteError::plugin(format!("content is not UTF-8 for {media_type}: {e}")))?;
        return Ok(Value::String(text));
    }

    let encoded = general_purpose::STANDARD.encode(bytes);
    Ok(Value::String(format!(
        "data:{};base64,{encoded}",
        essence(media_type)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_classes() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(is_json_media_type("application/ld+json"));
        assert!(!is_json_media_type("text/plain"));

        assert!(is_text_media_type("text/csv"));
        assert!(is_text_media_type("application/xml"));
        assert!(!is_text_media_type("image/png"));
    }

    #[test]
    fn test_decode_json() {
        let value = decode(br#"{"firstName": "Joe", "age": 32}"#, "application/json").unwrap();
        assert_eq!(value, json!({"firstName": "Joe", "age": 32}));

        let err = decode(b"not json", "application/json").unwrap_err();
        assert!(matches!(err, OteError::Plugin(_)));
    }

    #[test]
    fn test_decode_text_and_binary() {
        assert_eq!(decode(b"a,b\n1,2\n", "text/csv").unwrap(), json!("a,b\n1,2\n"));
        assert_eq!(
            decode(&[0x89, 0x50, 0x4e, 0x47], "image/png").unwrap(),
            json!("data:image/png;base64,iVBORw==")
        );
    }
}
