//! Best-effort repair of almost-JSON model output
//!
//! Models wrap their JSON in prose or code fences, use single quotes, leave
//! keys unquoted, add trailing commas, write Python literals or stop before
//! the closing brace. `repair_json` rewrites those into strict JSON. It does
//! not guarantee the result parses.

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fence(value: &str) -> &str {
    let trimmed = value.trim();
    let inner = if let Some(stripped) = trimmed.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = trimmed.strip_prefix("```JSON") {
        stripped
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        stripped
    } else {
        return trimmed;
    };
    inner.trim().trim_end_matches("```").trim()
}

/// Rewrite near-JSON text into strict JSON
pub fn repair_json(raw: &str) -> String {
    let text = extract_object(raw);
    let chars: Vec<char> = text.chars().collect();

    let mut out = String::with_capacity(text.len() + 16);
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out);
                continue;
            }
            '{' => {
                stack.push('}');
                out.push(c);
            }
            '[' => {
                stack.push(']');
                out.push(c);
            }
            '}' | ']' => {
                drop_trailing_comma(&mut out);
                if stack.last() == Some(&c) {
                    stack.pop();
                    out.push(c);
                }
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']') | None) {
                    out.push(c);
                }
            }
            // Exponent of a number such as 1.5e3
            c if c.is_alphabetic() && out.ends_with(|p: char| p.is_ascii_digit()) => out.push(c),
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let is_key = chars[i..].iter().find(|c| !c.is_whitespace()) == Some(&':');
                out.push_str(&bare_word(&word, is_key));
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }

    // Truncated output: finish what was started
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(':') {
        out.push_str(" null");
    }
    drop_trailing_comma(&mut out);
    while let Some(close) = stack.pop() {
        out.push(close);
    }
    out
}

/// The part of `raw` from its first `{` (or `[` when there is none) to the last closer
fn extract_object(raw: &str) -> &str {
    let text = strip_code_fence(raw);
    let Some(start) = text.find('{').or_else(|| text.find('[')) else {
        return text;
    };
    let open = text.as_bytes()[start];
    let close = if open == b'{' { '}' } else { ']' };
    match text.rfind(close) {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

/// Copy a string literal starting at `chars[start]` as a double-quoted
/// JSON string. Returns the index after the closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() => {
                let next = chars[i + 1];
                if next == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(next);
                }
                i += 2;
                continue;
            }
            c if c == quote => {
                out.push('"');
                return i + 1;
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
        i += 1;
    }
    // Unterminated string
    out.push('"');
    i
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn bare_word(word: &str, is_key: bool) -> String {
    if is_key {
        return format!("\"{}\"", word);
    }
    match word {
        "true" | "True" | "TRUE" => "true".to_string(),
        "false" | "False" | "FALSE" => "false".to_string(),
        "null" | "None" | "NULL" | "NaN" | "undefined" => "null".to_string(),
        _ => format!("\"{}\"", word),
    }
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}
