//! Locating the embedded JSON payload inside a saved issue page.
//!
//! Issue pages ship their timeline as
//! `<script type="application/json" data-target="react-app.embeddedData">`.
//! Attribute order and quoting vary, so script tags are matched first and
//! their attributes checked afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

/// Value of the `data-target` attribute on the payload script tag.
pub const EMBEDDED_DATA_TARGET: &str = "react-app.embeddedData";

static SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("Invalid regex")
});

static TYPE_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*["']?application/json["']?"#).expect("Invalid regex")
});

static DATA_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bdata-target\s*=\s*["']?react-app\.embeddedData["']?"#).expect("Invalid regex")
});

/// Return the raw text of the embedded payload script, if the page has one.
#[must_use]
pub fn find_embedded_payload(html: &str) -> Option<&str> {
    for caps in SCRIPT_TAG.captures_iter(html) {
        let (Some(attrs), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let attrs = attrs.as_str();
        if TYPE_JSON.is_match(attrs) && DATA_TARGET.is_match(attrs) {
            trace!(len = body.len(), "Found embedded payload script");
            return Some(body.as_str());
        }
    }
    None
}

/// Parse a raw document into the payload JSON.
///
/// Accepts either a bare JSON payload or an HTML page embedding it. Returns
/// `None` when neither yields valid JSON.
#[must_use]
pub fn parse_document(document: &str) -> Option<Value> {
    let trimmed = document.trim_start();
    if trimmed.starts_with('{') {
        match serde_json::from_str(trimmed) {
            Ok(value) => return Some(value),
            Err(e) => debug!(error = %e, "Document looks like JSON but does not parse"),
        }
    }

    let payload = find_embedded_payload(document)?;
    match serde_json::from_str(payload.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Embedded payload is not valid JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_payload_in_page() {
        let html = r#"<html><head>
<script type="application/json" data-target="other.thing">{"no":1}</script>
<script type="application/json" data-target="react-app.embeddedData">{"payload":{}}</script>
</head></html>"#;
        assert_eq!(find_embedded_payload(html), Some(r#"{"payload":{}}"#));
    }

    #[test]
    fn test_find_payload_attribute_order() {
        let html = r#"<script data-target='react-app.embeddedData' type='application/json'>
{"payload":{"x":1}}
</script>"#;
        let value = parse_document(html).unwrap();
        assert_eq!(value["payload"]["x"], 1);
    }

    #[test]
    fn test_plain_script_ignored() {
        let html = r#"<script>var data = {"payload":{}};</script>"#;
        assert!(find_embedded_payload(html).is_none());
        assert!(parse_document(html).is_none());
    }

    #[test]
    fn test_bare_json_document() {
        let value = parse_document(r#"  {"payload":{"y":2}}"#).unwrap();
        assert_eq!(value["payload"]["y"], 2);
    }

    #[test]
    fn test_malformed_payload() {
        let html = r#"<script type="application/json" data-target="react-app.embeddedData">{"payload":</script>"#;
        assert!(parse_document(html).is_none());
        assert!(parse_document("{not json").is_none());
        assert!(parse_document("").is_none());
    }
}
