use crate::config::HomeSelectors;
use crate::driver::Driver;
use crate::error::Result;
use crate::pages::{BasePage, PageContext};

/// The site's landing page
pub struct HomePage<D: Driver> {
    base: BasePage<D>,
    url: String,
    selectors: HomeSelectors,
}

impl<D: Driver> HomePage<D> {
    pub fn new(ctx: &PageContext<D>) -> Self {
        Self {
            base: BasePage::new(ctx),
            url: ctx.config.site.base_url.clone(),
            selectors: ctx.config.selectors.home.clone(),
        }
    }

    pub fn base(&self) -> &BasePage<D> {
        &self.base
    }

    /// Navigate to the site root and dismiss whatever popups show up
    pub async fn open(&self) -> Result<()> {
        self.base.report().step("Open home page");
        self.base.navigate_to(&self.url).await?;
        self.base.close_popups().await;
        Ok(())
    }

    /// Type `query` into the search box and submit
    ///
    /// The query is passed through as-is, including an empty one.
    pub async fn search_item(&self, query: &str) -> Result<()> {
        self.base.report().step(format!("Search for: {}", query));
        self.base.wait_for_visible(&self.selectors.search_box).await?;
        self.base.fill(&self.selectors.search_box, query).await?;
        self.base.click(&self.selectors.search_button).await
    }

    /// Whether a session appears to be signed in
    ///
    /// Only checks that the "Sign in" link is absent.
    pub async fn is_logged_in(&self) -> bool {
        !self.base.is_visible(&self.selectors.sign_in_link).await
    }
}
