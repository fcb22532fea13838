//! Query-string reading and rewriting.

use std::borrow::Cow;

/// Splits a URL into the part before the query, the query itself and the fragment.
fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    match without_fragment.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (without_fragment, None, fragment),
    }
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['+', '%']) {
        return Cow::Borrowed(raw);
    }

    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(spaced),
    }
}

fn pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// Returns the decoded value of the first `name` parameter in `url`.
///
/// A parameter written without `=` yields an empty string. Malformed escapes
/// are returned undecoded.
#[must_use]
pub fn query_parameter(url: &str, name: &str) -> Option<String> {
    let (_, query, _) = split_url(url);
    pairs(query?)
        .find(|(key, _)| decode_component(key) == name)
        .map(|(_, value)| decode_component(value).into_owned())
}

/// Returns the decoded value of `name`, or `default` when the parameter is absent.
#[must_use]
pub fn query_parameter_or(url: &str, name: &str, default: &str) -> String {
    query_parameter(url, name).unwrap_or_else(|| default.to_owned())
}

/// Returns `url` with the first `name` parameter set to `value`.
///
/// Later duplicates of `name` are dropped, other parameters keep their order
/// and encoding, and the parameter is appended when missing.
#[must_use]
pub fn with_query_parameter(url: &str, name: &str, value: &str) -> String {
    let (base, query, fragment) = split_url(url);
    let encoded = format!("{}={}", urlencoding::encode(name), urlencoding::encode(value));

    let mut replaced = false;
    let mut rebuilt: Vec<Cow<'_, str>> = Vec::new();
    for pair in query.unwrap_or("").split('&').filter(|pair| !pair.is_empty()) {
        let key = pair.split_once('=').map_or(pair, |(key, _)| key);
        if decode_component(key) == name {
            if !replaced {
                rebuilt.push(Cow::Owned(encoded.clone()));
                replaced = true;
            }
        } else {
            rebuilt.push(Cow::Borrowed(pair));
        }
    }
    if !replaced {
        rebuilt.push(Cow::Owned(encoded));
    }

    let mut result = format!("{base}?{}", rebuilt.join("&"));
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}
