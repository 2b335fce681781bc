pub mod webdriver;

#[cfg(test)]
pub mod mock;

use crate::error::Result;
use crate::selector::Selector;
use async_trait::async_trait;

/// Browser capabilities the page objects rely on
///
/// Calls are not bounded here; page objects wrap each one in their own
/// timeout.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Handle to an element on the current page
    type Element: Clone + Send + Sync;

    /// Load `url` in the current page
    async fn navigate(&self, url: &str) -> Result<()>;

    /// All elements matching `selector`, in document order
    async fn locate(&self, selector: &Selector) -> Result<Vec<Self::Element>>;

    /// All descendants of `parent` matching `selector`
    async fn locate_within(
        &self,
        parent: &Self::Element,
        selector: &Selector,
    ) -> Result<Vec<Self::Element>>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Replace the element's value with `text`
    async fn fill(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Rendered inner text
    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attr(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool>;

    /// Choose the `<option>` with the given value in a `<select>` element
    async fn select_value(&self, element: &Self::Element, value: &str) -> Result<()>;

    /// PNG bytes of the current page
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Serialized HTML of the current page
    async fn page_content(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;
}

/// A browser session that hands out one page per scenario
#[async_trait]
pub trait Session: Send + Sync {
    type Page: Driver + 'static;

    /// Open a fresh page for a scenario
    async fn open_page(&self) -> Result<Self::Page>;

    /// Release a page opened with `open_page`
    async fn close_page(&self, page: &Self::Page) -> Result<()>;
}
