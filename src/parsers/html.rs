use scraper::{Html, Selector};

/// Heuristic signals read from a rendered page's HTML
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    /// Contents of the `<title>` element, if any
    pub title: Option<String>,
    /// The page mentions a captcha
    pub captcha: bool,
    /// The page asks to sign in and shows no results, which usually means a
    /// redirect away from the search results
    pub wrong_page: bool,
}

/// Inspects page HTML for captcha and redirect hints
pub fn inspect(html: &str) -> PageSignals {
    let doc = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let title = doc
        .select(&title_selector)
        .next()
        .map(|t| normalize(t.text()))
        .filter(|t| !t.is_empty());

    let lowered = html.to_lowercase();
    let captcha = lowered.contains("captcha");
    let wrong_page = lowered.contains("sign in") && !lowered.contains("results");

    PageSignals {
        title,
        captcha,
        wrong_page,
    }
}

/// Visible body text with whitespace collapsed
pub fn body_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    let content_selector = Selector::parse("body").unwrap();
    normalize(doc.select(&content_selector).flat_map(|n| n.text()))
}

fn normalize<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
