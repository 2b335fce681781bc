use crate::config::SearchSelectors;
use crate::driver::mock::{Action, MockDriver, MockElement, MockPage};
use crate::pages::SearchResultsPage;
use crate::pages::tests::context;
use crate::parsers::price;
use crate::selector::Selector;

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_1: &str = "https://shop.test/sch/i.html?_nkw=shoes";
    const PAGE_2: &str = "https://shop.test/sch/i.html?_nkw=shoes&_pgn=2";

    fn selectors() -> SearchSelectors {
        SearchSelectors::default()
    }

    fn item_url(id: &str) -> String {
        format!("https://shop.test/itm/{}", id)
    }

    fn listing(id: &str, price_text: &str) -> MockElement {
        let s = selectors();
        MockElement::new(&format!("item-{}", id))
            .child(&s.item_price, MockElement::new("price").text(price_text))
            .child(
                &s.item_link,
                MockElement::new("link").attr("href", &item_url(id)),
            )
            .child(
                &s.item_title,
                MockElement::new("title").text(&format!("Running shoe {}", id)),
            )
    }

    fn classic() -> Selector {
        selectors().item_strategies[0].selector.clone()
    }

    fn next_button(to: &str) -> MockElement {
        MockElement::new("next").navigates_to(to)
    }

    #[tokio::test]
    async fn test_collects_first_qualifying_items_in_page_order() {
        let prices = [100, 150, 221, 50, 300, 90, 75, 260];
        let mut page = MockPage::new("shoes | eBay")
            .with(&selectors().next_page, next_button(PAGE_2));
        for (i, p) in prices.iter().enumerate() {
            page = page.with(&classic(), listing(&i.to_string(), &format!("${}.00", p)));
        }
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(220.0, 5)
            .await;

        let expected: Vec<String> = ["0", "1", "3", "5", "6"].iter().map(|i| item_url(i)).collect();
        assert_eq!(urls, expected);
        // Limit reached on the first page: the next-page control is never used
        assert!(ctx.driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_paginates_and_deduplicates() {
        let s = selectors();
        let first = MockPage::new("page 1")
            .with(&classic(), listing("a", "$20"))
            .with(&classic(), listing("b", "$500"))
            .with(&classic(), listing("c", "$30"))
            .with(&s.next_page, next_button(PAGE_2));
        let second = MockPage::new("page 2")
            .with(&classic(), listing("c", "$30"))
            .with(&classic(), listing("d", "$40"));
        let driver = MockDriver::new()
            .page(PAGE_1, first)
            .page(PAGE_2, second)
            .at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(100.0, 5)
            .await;

        assert_eq!(urls, vec![item_url("a"), item_url("c"), item_url("d")]);
        assert_eq!(ctx.driver.clicks(), vec!["next".to_string()]);
    }

    #[tokio::test]
    async fn test_inert_next_control_ends_the_walk() {
        let page = MockPage::new("last page")
            .with(&classic(), listing("a", "$10"))
            .with(&selectors().next_page, MockElement::new("next"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            SearchResultsPage::new(&ctx).get_items_under_price(220.0, 5),
        )
        .await
        .expect("collection should stop on an inert next control");

        assert_eq!(urls, vec![item_url("a")]);
        // Once after the admitting pass, once after the empty rescan
        assert_eq!(ctx.driver.clicks(), vec!["next".to_string(), "next".to_string()]);
    }

    #[tokio::test]
    async fn test_under_fill_returns_what_was_found() {
        let page = MockPage::new("few")
            .with(&classic(), listing("a", "$10"))
            .with(&classic(), listing("b", "Free shipping"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(50.0, 10)
            .await;
        assert_eq!(urls, vec![item_url("a")]);
    }

    #[tokio::test]
    async fn test_no_items_with_any_strategy_returns_empty() {
        let page = MockPage::new("empty").with(&selectors().next_page, next_button(PAGE_2));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(220.0, 5)
            .await;
        assert!(urls.is_empty());
        assert!(ctx.driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_past_failing_and_empty_strategies() {
        let strategies = selectors().item_strategies;
        let structural = strategies.last().unwrap().selector.clone();
        let page = MockPage::new("drifted markup")
            .failing(&strategies[0].selector)
            .with(&structural, listing("x", "$12.50"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(20.0, 3)
            .await;
        assert_eq!(urls, vec![item_url("x")]);
    }

    #[tokio::test]
    async fn test_earlier_strategy_takes_precedence() {
        let strategies = selectors().item_strategies;
        let page = MockPage::new("both")
            .with(&strategies[0].selector, listing("early", "$5"))
            .with(&strategies[2].selector, listing("late", "$5"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(20.0, 3)
            .await;
        assert_eq!(urls, vec![item_url("early")]);
    }

    #[tokio::test]
    async fn test_item_failures_are_skipped_and_title_is_optional() {
        let s = selectors();
        let no_price = MockElement::new("no-price")
            .child(&s.item_link, MockElement::new("link").attr("href", &item_url("np")));
        let no_link = MockElement::new("no-link")
            .child(&s.item_price, MockElement::new("price").text("$10"));
        let empty_href = MockElement::new("empty-href")
            .child(&s.item_price, MockElement::new("price").text("$10"))
            .child(&s.item_link, MockElement::new("link").attr("href", "  "));
        let unreadable_price = MockElement::new("unreadable")
            .child(&s.item_price, MockElement::new("price"))
            .child(&s.item_link, MockElement::new("link").attr("href", &item_url("u")));
        let untitled = MockElement::new("untitled")
            .child(&s.item_price, MockElement::new("price").text("$15"))
            .child(&s.item_link, MockElement::new("link").attr("href", &item_url("t")));

        let page = MockPage::new("mixed")
            .with(&classic(), no_price)
            .with(&classic(), no_link)
            .with(&classic(), empty_href)
            .with(&classic(), unreadable_price)
            .with(&classic(), untitled)
            .with(&classic(), listing("ok", "$20"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(50.0, 5)
            .await;
        assert_eq!(urls, vec![item_url("t"), item_url("ok")]);
    }

    #[tokio::test]
    async fn test_relative_links_are_resolved() {
        let s = selectors();
        let relative = MockElement::new("relative")
            .child(&s.item_price, MockElement::new("price").text("US $1,234.56"))
            .child(&s.item_link, MockElement::new("link").attr("href", "/itm/rel"));
        let page = MockPage::new("relative").with(&classic(), relative);
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(2000.0, 1)
            .await;
        assert_eq!(urls, vec![item_url("rel")]);
    }

    #[tokio::test]
    async fn test_results_respect_invariants() {
        let listings = [
            ("a", "$5"),
            ("a", "$5"),
            ("b", "$0"),
            ("c", "$19.99"),
            ("d", "$20"),
            ("e", "$20.01"),
            ("f", "garbage"),
            ("g", "$1"),
            ("c", "$19.99"),
        ];
        let mut page = MockPage::new("invariants");
        for (id, p) in listings {
            page = page.with(&classic(), listing(id, p));
        }
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        for limit in 1..=6 {
            let urls = SearchResultsPage::new(&ctx)
                .get_items_under_price(20.0, limit)
                .await;
            assert!(urls.len() <= limit);
            let mut unique = urls.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), urls.len());
            for url in &urls {
                let (_, text) = listings
                    .iter()
                    .find(|(id, _)| item_url(id) == *url)
                    .unwrap();
                let found = price::extract_price(text);
                assert!(price::is_price_valid(found, 20.0), "{} priced {}", url, found);
            }
        }

        let all = SearchResultsPage::new(&ctx)
            .get_items_under_price(20.0, 10)
            .await;
        let expected: Vec<String> = ["a", "c", "d", "g"].iter().map(|i| item_url(i)).collect();
        assert_eq!(all, expected);
    }

    #[tokio::test]
    async fn test_first_page_diagnostics_do_not_abort() {
        let page = MockPage::new("Security check")
            .content("<html><body>Please complete the captcha. Sign in</body></html>")
            .with(&classic(), listing("a", "$10"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, dir) = context(driver);

        let urls = SearchResultsPage::new(&ctx)
            .get_items_under_price(50.0, 1)
            .await;
        assert_eq!(urls, vec![item_url("a")]);
        assert!(dir.path().join("screenshots/search_results_page.png").exists());
        assert!(ctx.driver.actions().contains(&Action::Screenshot));
    }

    #[tokio::test]
    async fn test_apply_price_filter_fills_and_submits() {
        let s = selectors();
        let page = MockPage::new("filters")
            .with(&s.max_price_input, MockElement::new("max"))
            .with(&s.price_submit, MockElement::new("submit"));
        let driver = MockDriver::new().page(PAGE_1, page).at(PAGE_1);
        let (ctx, _dir) = context(driver);

        SearchResultsPage::new(&ctx).apply_price_filter(220.75).await;

        let actions = ctx.driver.actions();
        assert!(actions.contains(&Action::Fill("max".to_string(), "220".to_string())));
        assert_eq!(ctx.driver.clicks(), vec!["submit".to_string()]);
    }

    #[tokio::test]
    async fn test_apply_price_filter_without_control_is_silent() {
        let driver = MockDriver::new()
            .page(PAGE_1, MockPage::new("no filters"))
            .at(PAGE_1);
        let (ctx, _dir) = context(driver);

        let page = SearchResultsPage::new(&ctx);
        page.apply_price_filter(100.0).await;
        assert!(!page.try_apply_price_filter(100.0).await.unwrap());
        assert!(ctx.driver.actions().is_empty());
    }
}
