//! Magic links: URLs whose `event` query parameter prefills the claim form.

use url::Url;

/// Query parameter carrying the event name.
pub const EVENT_PARAM: &str = "event";

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_event_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The normalized event name carried by `url`, if any.
///
/// The parameter is percent-decoded once.
pub fn event_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == EVENT_PARAM)
        .map(|(_, value)| normalize_event_name(&value))
        .filter(|name| !name.is_empty())
}

/// Build the shareable link for `event` under `origin`.
pub fn magic_link(origin: &Url, event: &str) -> Url {
    let mut link = origin.clone();
    link.set_path("/");
    link.set_fragment(None);
    link.query_pairs_mut()
        .clear()
        .append_pair(EVENT_PARAM, &normalize_event_name(event));
    link
}

/// Interpret claim-form input, which may be a plain name or a pasted link.
pub fn resolve_claim_input(input: &str) -> String {
    match Url::parse(input.trim()) {
        Ok(url) => event_from_url(&url).unwrap_or_else(|| normalize_event_name(input)),
        Err(_) => normalize_event_name(input),
    }
}
