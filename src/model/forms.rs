//! Form body decoding
//!
//! Decodes `application/x-www-form-urlencoded` request bodies into a
//! name→value mapping. Malformed input degrades to whatever pairs could be
//! recovered; this function never fails.

use std::collections::HashMap;

/// Decode a form-encoded request body into name/value pairs
///
/// Pairs without a name are skipped; a pair without `=` is kept with an empty
/// value; percent-escapes that do not decode are passed through verbatim.
pub fn parse_form_body(body: &[u8]) -> HashMap<String, String> {
    let raw = String::from_utf8_lossy(body);
    let mut inputs = HashMap::new();

    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name, value),
            None => (pair, ""),
        };

        let name = decode_component(name);
        if name.is_empty() {
            continue;
        }

        inputs.insert(name, decode_component(value));
    }

    inputs
}

/// Percent-decode one form component, treating `+` as a space
fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}
