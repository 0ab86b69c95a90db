use crate::params::Pair;

/// Percent-escape a query component with form encoding rules, except that
/// spaces become `%20`, never `+`. `*-._` stay literal; `~` is escaped.
#[must_use]
pub fn escape_string(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Concatenate `base_path`, `path` and the escaped query pairs.
///
/// A `?` already present in `path` makes the first appended pair use `&`.
/// Pairs without a value are dropped entirely.
pub fn build_url(base_path: &str, path: &str, query: &[Pair]) -> String {
    let mut url = String::with_capacity(base_path.len() + path.len());
    url.push_str(base_path);
    url.push_str(path);

    let mut separator = if path.contains('?') { '&' } else { '?' };
    for pair in query {
        let Some(value) = pair.value() else {
            continue;
        };
        url.push(separator);
        separator = '&';
        url.push_str(&escape_string(pair.name()));
        url.push('=');
        url.push_str(&escape_string(value));
    }
    url
}
