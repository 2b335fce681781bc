use crate::config::SearchSelectors;
use crate::driver::Driver;
use crate::error::Result;
use crate::pages::{BasePage, PageContext};
use crate::parsers::{html, price};
use crate::utils;

/// Search results, one page of listings at a time
pub struct SearchResultsPage<D: Driver> {
    base: BasePage<D>,
    selectors: SearchSelectors,
}

/// Listings found by one selector strategy
struct Listings<E> {
    strategy: String,
    items: Vec<E>,
}

impl<D: Driver> SearchResultsPage<D> {
    pub fn new(ctx: &PageContext<D>) -> Self {
        Self {
            base: BasePage::new(ctx),
            selectors: ctx.config.selectors.search.clone(),
        }
    }

    pub fn base(&self) -> &BasePage<D> {
        &self.base
    }

    /// Collects up to `limit` listing URLs priced within `(0, max_price]`
    ///
    /// Walks result pages in order until the limit is reached, no listings
    /// are found, or there is no next page. A next-page control that leaves
    /// the URL unchanged while the page yields nothing new also ends the
    /// walk. URLs are returned in discovery order without duplicates.
    /// Returning fewer than `limit` is not an error.
    pub async fn get_items_under_price(&self, max_price: f64, limit: usize) -> Vec<String> {
        self.base.report().step(format!(
            "Get items under price: ${}, limit: {}",
            max_price, limit
        ));

        let timeouts = *self.base.timeouts();
        let ready = self.selectors.item_strategies.first().map(|s| &s.selector);
        let mut collected: Vec<String> = Vec::new();
        let mut page_number = 1;

        while collected.len() < limit {
            ::log::info!(
                "Scanning page {} for items under ${}",
                page_number,
                max_price
            );
            self.base.settle(ready, timeouts.settle()).await;

            let current_url = self.base.current_url().await.unwrap_or_default();
            ::log::info!("Current URL: {}", current_url);

            if page_number == 1 {
                self.diagnose_first_page().await;
            }

            let Some(listings) = self.resolve_listings().await else {
                ::log::error!("No items found on page with any selector!");
                ::log::error!("URL: {}", current_url);
                break;
            };
            ::log::info!(
                "Found {} items with selector: {}",
                listings.items.len(),
                listings.strategy
            );

            let before = collected.len();
            for item in &listings.items {
                if collected.len() >= limit {
                    break;
                }
                match self.qualifying_link(item, max_price, &current_url).await {
                    Ok(Some((url, found_price))) => {
                        if collected.contains(&url) {
                            continue;
                        }
                        let title = self.item_title(item).await;
                        ::log::info!("Found item: {}... - ${}", truncate(&title, 50), found_price);
                        collected.push(url);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // Ads and placeholder rows often lack a price or link
                        ::log::debug!("Skipping item: {}", e);
                    }
                }
            }

            if collected.len() >= limit {
                break;
            }

            if self.base.is_visible(&self.selectors.next_page).await {
                ::log::info!("Moving to next page...");
                if let Err(e) = self.base.click(&self.selectors.next_page).await {
                    ::log::error!("Could not open next page: {}", e);
                    break;
                }
                page_number += 1;
                let moved = self
                    .base
                    .wait_for_url_change(&current_url, timeouts.short_settle())
                    .await;
                if !moved && collected.len() == before {
                    // Same page again with nothing new: the control is inert
                    ::log::info!(
                        "Next page did not load. Found {} items total.",
                        collected.len()
                    );
                    break;
                }
                if !moved {
                    ::log::debug!("URL unchanged after clicking next page");
                }
            } else {
                ::log::info!(
                    "No more pages available. Found {} items total.",
                    collected.len()
                );
                break;
            }
        }

        collected.truncate(limit);
        collected
    }

    /// Use the site's max-price filter if the page offers one
    ///
    /// A missing control is fine; failures are logged and swallowed.
    pub async fn apply_price_filter(&self, max_price: f64) {
        self.base
            .report()
            .step(format!("Apply price filter: max ${}", max_price));

        if let Err(e) = self.try_apply_price_filter(max_price).await {
            ::log::error!("Could not apply price filter: {}", e);
        }
    }

    pub async fn try_apply_price_filter(&self, max_price: f64) -> Result<bool> {
        if !self.base.is_visible(&self.selectors.max_price_input).await {
            ::log::debug!("No max price filter on this page");
            return Ok(false);
        }

        let bound = (max_price.trunc() as i64).to_string();
        self.base
            .fill(&self.selectors.max_price_input, &bound)
            .await?;

        if !self.base.is_visible(&self.selectors.price_submit).await {
            return Ok(false);
        }
        self.base.click(&self.selectors.price_submit).await?;
        let ready = self.selectors.item_strategies.first().map(|s| &s.selector);
        self.base
            .settle(ready, self.base.timeouts().short_settle())
            .await;
        ::log::info!("Applied price filter: max ${}", max_price);
        Ok(true)
    }

    /// First strategy, in configured order, that matches at least one element
    async fn resolve_listings(&self) -> Option<Listings<D::Element>> {
        for strategy in &self.selectors.item_strategies {
            match self.base.all(&strategy.selector).await {
                Ok(items) if !items.is_empty() => {
                    return Some(Listings {
                        strategy: strategy.name.clone(),
                        items,
                    });
                }
                Ok(_) => ::log::debug!("Strategy '{}' matched nothing", strategy.name),
                Err(e) => ::log::debug!("Strategy '{}' failed: {}", strategy.name, e),
            }
        }
        None
    }

    /// The listing's resolved URL and price, if the price is within bounds
    async fn qualifying_link(
        &self,
        item: &D::Element,
        max_price: f64,
        page_url: &str,
    ) -> Result<Option<(String, f64)>> {
        let probe = self.base.timeouts().visibility_probe();

        let price_element = self.base.first_within(item, &self.selectors.item_price).await?;
        let price_text = self
            .base
            .element_text(&price_element, "item price", probe)
            .await?;
        let found_price = price::extract_price(&price_text);

        if !price::is_price_valid(found_price, max_price) {
            ::log::trace!("Rejected price {:?} ({})", price_text, found_price);
            return Ok(None);
        }

        let link = self.base.first_within(item, &self.selectors.item_link).await?;
        let href = self.base.element_attr(&link, "href").await?;

        Ok(href
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .map(|h| (utils::resolve_link(page_url, &h), found_price)))
    }

    /// Title for logging; never blocks admission
    async fn item_title(&self, item: &D::Element) -> String {
        let probe = self.base.timeouts().visibility_probe();
        let title = async {
            let element = self.base.first_within(item, &self.selectors.item_title).await?;
            self.base.element_text(&element, "item title", probe).await
        };
        match title.await {
            Ok(title) => title,
            Err(e) => {
                ::log::debug!("No title for item: {}", e);
                "<untitled>".to_string()
            }
        }
    }

    /// Screenshot plus captcha and redirect heuristics; never aborts the scan
    async fn diagnose_first_page(&self) {
        if let Err(e) = self.base.take_screenshot(Some("search_results_page")).await {
            ::log::error!("Could not capture search results: {}", e);
        }

        let content = match self.base.page_content().await {
            Ok(content) => content,
            Err(e) => {
                ::log::debug!("Could not read page content: {}", e);
                return;
            }
        };

        let signals = html::inspect(&content);
        let title = match self.base.title().await {
            Ok(title) if !title.is_empty() => Some(title),
            _ => signals.title.clone(),
        };
        ::log::info!("Page title: {}", title.as_deref().unwrap_or("<none>"));

        if signals.captcha {
            ::log::error!("CAPTCHA detected! Need to solve it.");
        }
        if signals.wrong_page {
            ::log::error!("Might be on wrong page - check screenshot");
            ::log::debug!("Page text: {}", truncate(&html::body_text(&content), 200));
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
