use crate::config::Timeouts;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::pages::PageContext;
use crate::report::Report;
use crate::selector::Selector;
use crate::utils;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

/// Interaction primitives shared by every page object
///
/// Clicks and fills scroll their target into view first, and every driver
/// call is bounded by one of the shared `Timeouts`.
pub struct BasePage<D: Driver> {
    driver: Arc<D>,
    timeouts: Timeouts,
    popups: Vec<Selector>,
    screenshots_dir: PathBuf,
    report: Report,
}

impl<D: Driver> BasePage<D> {
    pub fn new(ctx: &PageContext<D>) -> Self {
        Self {
            driver: Arc::clone(&ctx.driver),
            timeouts: ctx.config.timeouts,
            popups: ctx.config.selectors.popups.0.clone(),
            screenshots_dir: ctx.config.screenshots_dir.clone(),
            report: ctx.report.clone(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Run a driver call, failing with `Error::Timeout` once `limit` elapses
    pub async fn bounded<T, F>(&self, what: &str, limit: Duration, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(what, limit)),
        }
    }

    pub async fn navigate_to(&self, url: &str) -> Result<()> {
        self.report.step(format!("Navigate to {}", url));
        self.bounded(url, self.timeouts.interaction(), self.driver.navigate(url))
            .await
    }

    /// First element matching `selector`
    pub async fn first(&self, selector: &Selector) -> Result<D::Element> {
        let elements = self
            .bounded(
                selector.as_str(),
                self.timeouts.interaction(),
                self.driver.locate(selector),
            )
            .await?;
        elements
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(selector.to_string()))
    }

    /// All elements matching `selector`
    pub async fn all(&self, selector: &Selector) -> Result<Vec<D::Element>> {
        self.bounded(
            selector.as_str(),
            self.timeouts.interaction(),
            self.driver.locate(selector),
        )
        .await
    }

    /// First descendant of `parent` matching `selector`
    pub async fn first_within(&self, parent: &D::Element, selector: &Selector) -> Result<D::Element> {
        let elements = self
            .bounded(
                selector.as_str(),
                self.timeouts.interaction(),
                self.driver.locate_within(parent, selector),
            )
            .await?;
        elements
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(selector.to_string()))
    }

    /// Scroll the first match into view, then click it
    pub async fn click(&self, selector: &Selector) -> Result<()> {
        let element = self.first(selector).await?;
        self.click_element(&element, selector.as_str()).await
    }

    pub async fn click_element(&self, element: &D::Element, what: &str) -> Result<()> {
        let limit = self.timeouts.interaction();
        self.bounded(what, limit, self.driver.scroll_into_view(element))
            .await?;
        self.bounded(what, limit, self.driver.click(element)).await
    }

    /// Scroll the first match into view, then replace its value with `text`
    pub async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        let limit = self.timeouts.interaction();
        let element = self.first(selector).await?;
        self.bounded(selector.as_str(), limit, self.driver.scroll_into_view(&element))
            .await?;
        self.bounded(selector.as_str(), limit, self.driver.fill(&element, text))
            .await
    }

    pub async fn get_text(&self, selector: &Selector) -> Result<String> {
        let element = self.first(selector).await?;
        self.bounded(
            selector.as_str(),
            self.timeouts.interaction(),
            self.driver.text(&element),
        )
        .await
    }

    pub async fn element_text(&self, element: &D::Element, what: &str, limit: Duration) -> Result<String> {
        self.bounded(what, limit, self.driver.text(element)).await
    }

    pub async fn element_attr(&self, element: &D::Element, name: &str) -> Result<Option<String>> {
        self.bounded(
            name,
            self.timeouts.interaction(),
            self.driver.attr(element, name),
        )
        .await
    }

    /// Poll until a match is displayed, up to the interaction timeout
    pub async fn wait_for_visible(&self, selector: &Selector) -> Result<()> {
        let limit = self.timeouts.interaction();
        let deadline = Instant::now() + limit;
        loop {
            if let Ok(true) = self.probe_visible(selector, limit).await {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::timeout(
                    format!("{} to become visible", selector),
                    limit,
                ));
            }
            sleep(self.timeouts.poll_interval()).await;
        }
    }

    /// Whether the first match is displayed, as an explicit result
    pub async fn probe_visible(&self, selector: &Selector, limit: Duration) -> Result<bool> {
        self.bounded(selector.as_str(), limit, async {
            match self.driver.locate(selector).await?.first() {
                Some(element) => self.driver.is_visible(element).await,
                None => Ok(false),
            }
        })
        .await
    }

    /// Soft visibility check: any failure reads as "not visible"
    pub async fn is_visible(&self, selector: &Selector) -> bool {
        match self
            .probe_visible(selector, self.timeouts.visibility_probe())
            .await
        {
            Ok(visible) => visible,
            Err(e) => {
                ::log::debug!("Visibility probe for {} failed: {}", selector, e);
                false
            }
        }
    }

    /// Poll until any of `selectors` matches at least one element, up to `cap`
    ///
    /// Returns whether a match appeared.
    pub async fn wait_for_any(&self, selectors: &[Selector], cap: Duration) -> bool {
        let deadline = Instant::now() + cap;
        loop {
            for selector in selectors {
                let found = self
                    .bounded(selector.as_str(), cap, self.driver.locate(selector))
                    .await
                    .map(|els| !els.is_empty())
                    .unwrap_or(false);
                if found {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.timeouts.poll_interval()).await;
        }
    }

    /// Let client-side rendering settle
    ///
    /// Waits for `ready` to be present, capped at `cap`; without a ready
    /// selector, sleeps for `cap`.
    pub async fn settle(&self, ready: Option<&Selector>, cap: Duration) {
        match ready {
            Some(selector) => {
                if !self.wait_for_any(std::slice::from_ref(selector), cap).await {
                    ::log::debug!("{} not present after {}ms", selector, cap.as_millis());
                }
            }
            None => sleep(cap).await,
        }
    }

    /// Poll until the page URL differs from `previous`, up to `cap`
    pub async fn wait_for_url_change(&self, previous: &str, cap: Duration) -> bool {
        let deadline = Instant::now() + cap;
        loop {
            match self.current_url().await {
                Ok(url) if url != previous => return true,
                _ => {}
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.timeouts.poll_interval()).await;
        }
    }

    /// Best-effort sweep over known consent and close buttons
    ///
    /// Clicks the first visible match of every popup selector. Never fails
    /// and does not guarantee that popups are gone.
    pub async fn close_popups(&self) {
        let probe = self.timeouts.popup_probe();
        if !self.wait_for_any(&self.popups, probe).await {
            ::log::debug!("No popups found");
            return;
        }

        for selector in &self.popups {
            let visible = matches!(self.probe_visible(selector, probe).await, Ok(true));
            if !visible {
                continue;
            }
            let clicked = async {
                let element = self.first(selector).await?;
                self.bounded(
                    selector.as_str(),
                    probe,
                    self.driver.scroll_into_view(&element),
                )
                .await?;
                self.bounded(selector.as_str(), probe, self.driver.click(&element))
                    .await
            };
            match clicked.await {
                Ok(()) => ::log::info!("Closed popup via {}", selector),
                Err(e) => ::log::debug!("Could not close popup {}: {}", selector, e),
            }
        }
    }

    /// Capture the page to `<screenshots_dir>/<name>.png` and attach it to the report
    ///
    /// Unnamed screenshots are named by timestamp. Existing files are overwritten.
    /// WebDriver captures the visible viewport only, not the full scrollable page.
    pub async fn take_screenshot(&self, name: Option<&str>) -> Result<PathBuf> {
        let name = match name {
            Some(name) => utils::sanitize_filename(name),
            None => utils::timestamped_name("screenshot"),
        };

        let bytes = self
            .bounded(
                "screenshot",
                self.timeouts.interaction(),
                self.driver.screenshot(),
            )
            .await?;

        tokio::fs::create_dir_all(&self.screenshots_dir).await?;
        let path = self.screenshots_dir.join(format!("{}.png", name));
        tokio::fs::write(&path, &bytes).await?;

        self.report.attach(&name, &path);
        ::log::info!("Saved screenshot {}", path.display());
        Ok(path)
    }

    pub async fn current_url(&self) -> Result<String> {
        self.bounded(
            "current url",
            self.timeouts.interaction(),
            self.driver.current_url(),
        )
        .await
    }

    pub async fn page_content(&self) -> Result<String> {
        self.bounded(
            "page content",
            self.timeouts.interaction(),
            self.driver.page_content(),
        )
        .await
    }

    pub async fn title(&self) -> Result<String> {
        self.bounded("title", self.timeouts.interaction(), self.driver.title())
            .await
    }
}
