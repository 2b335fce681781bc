use url::Url;

/// Convert a string to a sanitized filename
pub fn sanitize_filename(name: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = name.replace("http://", "").replace("https://", "");
    name = name.replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|', ' '], "_");

    // Limit filename length
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}

/// Screenshot name for the current local time, e.g. `screenshot_20250101_120000`
pub fn timestamped_name(prefix: &str) -> String {
    format!("{}_{}", prefix, chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// Resolve an `href` against the page it was found on
///
/// Falls back to the raw value when either side is not a valid URL.
pub fn resolve_link(page_url: &str, href: &str) -> String {
    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
