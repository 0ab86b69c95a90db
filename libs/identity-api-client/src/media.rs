//! Content negotiation helpers.

pub const APPLICATION_JSON: &str = "application/json";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// `application/json`, any case, optionally followed by `;` parameters.
#[must_use]
pub fn is_json_mime(mime: &str) -> bool {
    let essence = mime.split_once(';').map_or(mime, |(essence, _)| essence);
    essence.eq_ignore_ascii_case(APPLICATION_JSON)
}

/// Pick the `Accept` header value: the first JSON candidate, otherwise all
/// candidates comma-joined. No candidates means no header.
#[must_use]
pub fn select_header_accept<S: AsRef<str>>(accepts: &[S]) -> Option<String> {
    if accepts.is_empty() {
        return None;
    }
    if let Some(json) = accepts.iter().find(|a| is_json_mime(a.as_ref())) {
        return Some(json.as_ref().to_owned());
    }
    Some(
        accepts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Pick the `Content-Type` header value: the first JSON candidate, otherwise
/// the first candidate. No candidates means JSON.
#[must_use]
pub fn select_header_content_type<S: AsRef<str>>(content_types: &[S]) -> String {
    content_types
        .iter()
        .find(|c| is_json_mime(c.as_ref()))
        .or_else(|| content_types.first())
        .map_or_else(|| APPLICATION_JSON.to_owned(), |c| c.as_ref().to_owned())
}
