use url::Url;

/// One renderable segment of an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSpan {
    Text(String),
    Link(String),
}

/// Split message content into text and actionable link spans.
///
/// A link candidate is a bare `http://` or `https://` run up to the next
/// whitespace. Candidates that do not parse as a URL stay plain text. This
/// is a display-time transform; the stored content is never rewritten.
pub fn content_spans(content: &str) -> Vec<ContentSpan> {
    let mut spans = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = find_scheme(&content[cursor..]) {
        let link_start = cursor + offset;
        let link_end = content[link_start..]
            .find(char::is_whitespace)
            .map_or(content.len(), |end| link_start + end);
        let candidate = &content[link_start..link_end];

        if Url::parse(candidate).is_ok() {
            push_text(&mut spans, &content[text_start..link_start]);
            spans.push(ContentSpan::Link(candidate.to_string()));
            text_start = link_end;
        }
        cursor = link_end;
    }

    push_text(&mut spans, &content[text_start..]);
    spans
}

fn find_scheme(haystack: &str) -> Option<usize> {
    let http = haystack.find("http://");
    let https = haystack.find("https://");
    match (http, https) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn push_text(spans: &mut Vec<ContentSpan>, text: &str) {
    if !text.is_empty() {
        spans.push(ContentSpan::Text(text.to_string()));
    }
}
