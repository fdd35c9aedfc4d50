//! Plain-text extraction from message payloads.
//!
//! Only the top-level payload and its direct sub-parts are inspected.
//! Nested multiparts (e.g. `multipart/mixed` wrapping `multipart/alternative`)
//! are not searched and yield an empty body.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use scraper::Html;

use super::MessagePayload;

/// URL-safe base64 that accepts both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

const BLOCK_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
    "section", "article", "header", "footer", "ul", "ol",
];

/// Best-effort plain text for a payload.
///
/// With sub-parts: the first `text/plain` part carrying data, else the first
/// `text/html` part carrying data (markup stripped), else `""`.
/// Without sub-parts: the payload's own body data, else `""`.
pub fn extract_text(payload: &MessagePayload) -> String {
    let Some(parts) = payload.parts.as_deref() else {
        return payload
            .body
            .data
            .as_deref()
            .map(decode_body)
            .unwrap_or_default();
    };

    let with_data = |mime: &str| {
        parts
            .iter()
            .find(|p| p.mime_type.eq_ignore_ascii_case(mime) && p.body.data.is_some())
            .and_then(|p| p.body.data.as_deref())
    };

    if let Some(data) = with_data("text/plain") {
        return decode_body(data);
    }
    if let Some(data) = with_data("text/html") {
        return html_to_text(&decode_body(data));
    }
    String::new()
}

/// Decode URL-safe base64 body data into text. Invalid UTF-8 is replaced;
/// undecodable data yields an empty string.
pub fn decode_body(data: &str) -> String {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match URL_SAFE_LENIENT.decode(cleaned.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!("undecodable message body: {e}");
            String::new()
        }
    }
}

/// Strip markup from an HTML document, keeping visible text.
///
/// Block-level elements start a new line so line-oriented patterns still
/// work on the result.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for node in document.root_element().descendants() {
        if let Some(element) = node.value().as_element() {
            if BLOCK_ELEMENTS.contains(&element.name()) && !out.is_empty() && !out.ends_with('\n')
            {
                out.push('\n');
            }
            continue;
        }

        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }

    normalise_lines(&out)
}

fn normalise_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() && lines.last().is_some_and(|l| l.trim().is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::PartBody;

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::URL_SAFE.encode(text)
    }

    fn part(mime: &str, text: &str) -> MessagePayload {
        MessagePayload::single(mime, encode(text))
    }

    #[test]
    fn single_part_body_is_decoded() {
        let payload = part("text/plain", "We would like to appoint you");
        assert_eq!(extract_text(&payload), "We would like to appoint you");
    }

    #[test]
    fn single_part_without_data_is_empty() {
        let payload = MessagePayload {
            mime_type: "text/plain".into(),
            body: PartBody::default(),
            parts: None,
        };
        assert_eq!(extract_text(&payload), "");
    }

    #[test]
    fn prefers_plain_text_over_earlier_html() {
        let payload = MessagePayload::multipart(vec![
            part("text/html", "<p>html version</p>"),
            part("text/plain", "plain version"),
        ]);
        assert_eq!(extract_text(&payload), "plain version");
    }

    #[test]
    fn falls_back_to_stripped_html() {
        let payload = MessagePayload::multipart(vec![
            part("image/png", "not text"),
            part(
                "text/html",
                "<html><head><style>p{color:red}</style></head><body><p>Position: Data Analyst</p><p>Apply by 5 March 2025</p></body></html>",
            ),
        ]);
        assert_eq!(
            extract_text(&payload),
            "Position: Data Analyst\nApply by 5 March 2025"
        );
    }

    #[test]
    fn does_not_descend_into_nested_multipart() {
        let nested = MessagePayload::multipart(vec![part("text/plain", "hidden deep")]);
        let payload = MessagePayload::multipart(vec![nested]);
        assert_eq!(extract_text(&payload), "");
    }

    #[test]
    fn parts_without_data_are_skipped() {
        let empty_plain = MessagePayload {
            mime_type: "text/plain".into(),
            body: PartBody::default(),
            parts: None,
        };
        let payload = MessagePayload::multipart(vec![empty_plain, part("text/html", "<b>hi</b>")]);
        assert_eq!(extract_text(&payload), "hi");
    }

    #[test]
    fn accepts_unpadded_base64() {
        let unpadded = encode("hi!!").trim_end_matches('=').to_string();
        assert_eq!(decode_body(&unpadded), "hi!!");
        assert_eq!(decode_body("aGk"), "hi");
    }

    #[test]
    fn garbage_base64_is_empty() {
        assert_eq!(decode_body("***"), "");
    }

    #[test]
    fn script_content_is_dropped() {
        let text = html_to_text("<div>Welcome<script>var x = 1;</script></div><div>aboard</div>");
        assert_eq!(text, "Welcome\naboard");
    }
}
