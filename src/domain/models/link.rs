use url::Url;

/// Query parameters that identify a visit rather than a posting.
/// Compared case-insensitively; anything starting with `utm_` is also dropped.
const TRACKING_PARAMS: &[&str] = &[
    "trk",
    "trkinfo",
    "trackingid",
    "refid",
    "ref",
    "src",
    "from",
    "gclid",
    "fbclid",
    "position",
    "pagenum",
];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Canonical form of an application link, used as the uniqueness key when
/// ingesting listings.
///
/// Scheme and host are lowercased (by `Url`), fragments and tracking
/// parameters are dropped, and trailing slashes are removed. Text that does
/// not parse as a URL is only trimmed.
pub fn normalize_link(link: &str) -> String {
    let trimmed = link.trim();

    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => return trimmed.trim_end_matches('/').to_string(),
    };

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }

    if !url.cannot_be_a_base() {
        let path = url.path().trim_end_matches('/').to_string();
        url.set_path(&path);
    }

    let mut normalized = url.to_string();
    if url.query().is_none() {
        let len = normalized.trim_end_matches('/').len();
        normalized.truncate(len);
    }
    normalized
}
