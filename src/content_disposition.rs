//! Filename extraction from `Content-Disposition` response headers.

/// Pulls a usable file name out of a Content-Disposition header value.
///
/// Handles `filename="quoted"`, bare `filename=token`, and RFC 5987
/// `filename*=UTF-8''percent-encoded`; `filename*` wins when both appear.
pub fn filename_from_header(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let raw = raw.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                if let Some(encoded) = raw
                    .strip_prefix("UTF-8''")
                    .or_else(|| raw.strip_prefix("utf-8''"))
                {
                    let decoded = percent_decode(encoded);
                    if !decoded.is_empty() {
                        return Some(decoded);
                    }
                }
            }
            "filename" => {
                let unquoted = raw.trim_matches('"');
                if !unquoted.is_empty() {
                    plain = Some(unquoted.to_string());
                }
            }
            _ => {}
        }
    }

    plain
}

/// Reduces a suggested name to a bare file name safe to join onto the output
/// directory. Path separators become `_`; an empty result falls back to the
/// provided default.
pub fn sanitize_file_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

fn percent_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            out.push(b);
            continue;
        }
        let high = bytes.next().and_then(hex_value);
        let low = bytes.next().and_then(hex_value);
        match (high, low) {
            (Some(h), Some(l)) => out.push(h << 4 | l),
            // Malformed escape: keep what we consumed.
            (h, l) => {
                out.push(b'%');
                if let Some(x) = h {
                    out.push(x);
                }
                if let Some(x) = l {
                    out.push(x);
                }
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
