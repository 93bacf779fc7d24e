use std::collections::HashMap;

/// Parse a `Cookie` header value into name/value pairs.
///
/// - No IO
/// - No panics
/// - Malformed pairs are skipped; empty or garbage input yields an empty map
///
/// Pairs are separated by `;` and split on the first `=`. When a name repeats,
/// the first occurrence wins (browsers send the most specific cookie first).
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for pair in header.split(';') {
        let pair = pair.trim();
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };

        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        cookies
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }

    cookies
}
