//! HTML to plain text extraction

use std::iter::Peekable;
use std::str::Chars;

/// Elements whose content is never visible text
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "template", "head",
];

/// Elements allowed inside `<head>`; any other start tag implicitly ends it
const HEAD_TAGS: &[&str] = &[
    "title", "meta", "link", "base", "style", "script", "noscript", "template",
];

/// Elements that start a new text block
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "aside",
    "nav",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "table",
    "tr",
    "blockquote",
    "pre",
    "figure",
    "figcaption",
    "dd",
    "dt",
];

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct_lower = ct.to_lowercase();
        if ct_lower.contains("text/html") || ct_lower.contains("application/xhtml") {
            return true;
        }
    }

    let trimmed = body.trim_start();
    let head: String = trimmed.chars().take(15).collect::<String>().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// A parsed tag: lowercase name and whether it is a closing tag
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
}

/// Consume characters up to and including the next `>` and parse the tag
fn read_tag(chars: &mut Peekable<Chars>) -> Tag {
    let mut raw = String::new();
    for next in chars.by_ref() {
        if next == '>' {
            break;
        }
        raw.push(next);
    }

    let closing = raw.starts_with('/');
    let body = raw.trim_start_matches('/');
    let name = body
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Tag {
        name,
        closing,
        self_closing: raw.ends_with('/'),
    }
}

/// Convert HTML to plain text, one block of text per paragraph-like element
pub fn html_to_text(html: &str) -> String {
    let mut output = String::new();
    let mut skip_stack: Vec<String> = Vec::new();
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '<' && starts_tag(chars.peek()) {
            let tag = read_tag(&mut chars);

            // `</head>` is optional: the first body element closes it
            if !tag.closing
                && tag.name.starts_with(|c: char| c.is_ascii_alphabetic())
                && skip_stack.last().map(String::as_str) == Some("head")
                && !HEAD_TAGS.contains(&tag.name.as_str())
            {
                skip_stack.pop();
            }

            if SKIP_TAGS.contains(&tag.name.as_str()) {
                if tag.closing {
                    if let Some(pos) = skip_stack.iter().rposition(|t| *t == tag.name) {
                        skip_stack.truncate(pos);
                    }
                } else if !tag.self_closing {
                    skip_stack.push(tag.name);
                }
                continue;
            }

            if !skip_stack.is_empty() {
                continue;
            }

            if tag.name == "br" {
                output.push('\n');
            } else if BLOCK_TAGS.contains(&tag.name.as_str()) {
                output.push_str("\n\n");
            } else if matches!(tag.name.as_str(), "td" | "th") && tag.closing {
                output.push(' ');
            }
        } else if skip_stack.is_empty() {
            output.push(decode_entity(c, &mut chars));
        }
    }

    clean_whitespace(&output)
}

/// A `<` opens a tag only when followed by a name, `/`, `!` or `?`
fn starts_tag(next: Option<&char>) -> bool {
    matches!(next, Some(&c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Extract the document `<title>`, if present and non-empty
pub fn html_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title")?;

    let mut chars = html[start..end].chars().peekable();
    let mut title = String::new();
    while let Some(c) = chars.next() {
        title.push(decode_entity(c, &mut chars));
    }

    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Decode an HTML entity starting at an ampersand
fn decode_entity(c: char, chars: &mut Peekable<Chars>) -> char {
    if c != '&' {
        return c;
    }

    // Look ahead without consuming so unknown entities stay verbatim
    let mut lookahead = chars.clone();
    let mut entity = String::new();
    let mut terminated = false;
    for next in lookahead.by_ref() {
        if next == ';' {
            terminated = true;
            break;
        }
        if !(next.is_ascii_alphanumeric() || next == '#') || entity.len() > 10 {
            break;
        }
        entity.push(next);
    }

    if !terminated {
        return '&';
    }

    let decoded = match entity.as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        _ => entity.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };

    match decoded {
        Some(ch) => {
            *chars = lookahead;
            ch
        }
        None => '&',
    }
}

/// Collapse runs of whitespace, keep at most one blank line, trim
pub fn clean_whitespace(s: &str) -> String {
    let mut result = String::new();
    let mut pending_space = false;
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            pending_space = false;
            newline_count += 1;
        } else if c.is_whitespace() {
            pending_space = true;
        } else {
            if !result.is_empty() {
                if newline_count > 0 {
                    result.push_str(if newline_count > 1 { "\n\n" } else { "\n" });
                } else if pending_space {
                    result.push(' ');
                }
            }
            newline_count = 0;
            pending_space = false;
            result.push(c);
        }
    }

    result
}
