use crate::error::{Error, Result};
use crate::selector::{Selector, SelectorStrategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Interaction, probe and settle bounds shared by every page object
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Site entry points
    #[serde(default)]
    pub site: SiteConfig,

    /// Element selectors for every page
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Where screenshots are written
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: PathBuf,

    /// Where the run report is written
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Seed for random variant selection; a fresh seed is drawn when absent
    #[serde(default)]
    pub variant_seed: Option<u64>,
}

/// Supported browser engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

/// Browser launch and context settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: BrowserKind,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pause inserted before every driver command
    #[serde(default, alias = "slow_mo")]
    pub slow_mo_ms: u64,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Time bounds, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Bound for scroll, click, fill, text reads and visibility waits
    pub interaction_ms: u64,
    /// Bound for soft visibility probes
    pub visibility_probe_ms: u64,
    /// Bound for each popup probe and click
    pub popup_probe_ms: u64,
    /// Cap for waiting on a results page to render
    pub settle_ms: u64,
    /// Cap for waiting after navigation or a click that reloads content
    pub short_settle_ms: u64,
    /// Interval between condition polls
    pub poll_interval_ms: u64,
}

/// Site entry points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub base_url: String,
    pub cart_url: String,
}

/// Selectors for every page object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Consent and close buttons swept by `close_popups`
    pub popups: PopupSelectors,
    pub home: HomeSelectors,
    pub search: SearchSelectors,
    pub product: ProductSelectors,
    pub cart: CartSelectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopupSelectors(pub Vec<Selector>);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSelectors {
    pub search_box: Selector,
    pub search_button: Selector,
    pub sign_in_link: Selector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSelectors {
    /// Ordered fallbacks for the listing elements; the first one that
    /// matches anything wins
    pub item_strategies: Vec<SelectorStrategy>,
    pub item_link: Selector,
    pub item_price: Selector,
    pub item_title: Selector,
    pub next_page: Selector,
    pub max_price_input: Selector,
    pub price_submit: Selector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSelectors {
    pub add_to_cart: Selector,
    pub size_select: Selector,
    pub color_select: Selector,
    pub option: Selector,
    pub variant_buttons: Selector,
    pub popup_close: Selector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSelectors {
    pub items: Selector,
    pub subtotal: Selector,
    pub total: Selector,
}

/// One record of the scenario data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub search_query: String,
    pub max_price: f64,
    pub items_limit: usize,
    #[serde(default)]
    pub description: String,
}

/// The scenario data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub test_scenarios: Vec<ScenarioRecord>,
}

impl SuiteConfig {
    /// Load configuration from a YAML (`.yaml`/`.yml`) or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        if is_yaml(path) {
            Self::from_yaml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    /// Reject values no run can work with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.base_url)?;
        url::Url::parse(&self.site.cart_url)?;

        if self.selectors.search.item_strategies.is_empty() {
            return Err(Error::Config(
                "selectors.search.item_strategies must not be empty".to_string(),
            ));
        }
        if self.timeouts.interaction_ms == 0 {
            return Err(Error::Config(
                "timeouts.interaction_ms must be positive".to_string(),
            ));
        }
        if self.browser.viewport.width == 0 || self.browser.viewport.height == 0 {
            return Err(Error::Config("browser.viewport must be non-empty".to_string()));
        }
        Ok(())
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            webdriver_url: default_webdriver_url(),
            timeouts: Timeouts::default(),
            site: SiteConfig::default(),
            selectors: SelectorConfig::default(),
            screenshots_dir: default_screenshots_dir(),
            reports_dir: default_reports_dir(),
            variant_seed: None,
        }
    }
}

impl ScenarioFile {
    /// Load scenario records from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl Timeouts {
    pub fn interaction(&self) -> Duration {
        Duration::from_millis(self.interaction_ms)
    }

    pub fn visibility_probe(&self) -> Duration {
        Duration::from_millis(self.visibility_probe_ms)
    }

    pub fn popup_probe(&self) -> Duration {
        Duration::from_millis(self.popup_probe_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn short_settle(&self) -> Duration {
        Duration::from_millis(self.short_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            interaction_ms: 30_000,
            visibility_probe_ms: 5_000,
            popup_probe_ms: 2_000,
            settle_ms: 3_000,
            short_settle_ms: 2_000,
            poll_interval_ms: 100,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::default(),
            headless: true,
            slow_mo_ms: 0,
            viewport: Viewport::default(),
            locale: default_locale(),
            timezone: default_timezone(),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebay.com".to_string(),
            cart_url: "https://www.ebay.com/sh/sc".to_string(),
        }
    }
}

impl Default for PopupSelectors {
    fn default() -> Self {
        Self(
            [
                "//button[contains(normalize-space(.), 'Accept')]",
                "//button[contains(normalize-space(.), 'Accept All')]",
                "//button[contains(normalize-space(.), 'Close')]",
                "button[aria-label='Close']",
                "button[aria-label='close']",
                "[class*='close']",
                "#gdpr-banner-accept",
            ]
            .into_iter()
            .map(Selector::parse)
            .collect(),
        )
    }
}

impl Default for HomeSelectors {
    fn default() -> Self {
        Self {
            search_box: Selector::css("#gh-ac"),
            search_button: Selector::css("#gh-btn, input[value='Search'], button[type='submit']"),
            sign_in_link: Selector::xpath("//a[contains(normalize-space(.), 'Sign in')]"),
        }
    }
}

impl Default for SearchSelectors {
    fn default() -> Self {
        Self {
            item_strategies: vec![
                SelectorStrategy::new("classic list item", "li.s-item"),
                SelectorStrategy::new("results container", ".srp-results li"),
                SelectorStrategy::new("class contains s-item", "[class*='s-item']"),
                SelectorStrategy::new("div item", "div.s-item"),
                SelectorStrategy::new("data-view list item", "ul li[data-view]"),
                SelectorStrategy::new("structural", "//li[contains(@class, 's-item')]"),
            ],
            item_link: Selector::css("a.s-item__link, a[href*='/itm/'], .s-item__link"),
            item_price: Selector::css(".s-item__price, [class*='s-item__price'], span[class*='price']"),
            item_title: Selector::css(".s-item__title, h3, [class*='title']"),
            next_page: Selector::css(
                "a.pagination__next, a[aria-label='Go to next search page'], nav a[rel='next']",
            ),
            max_price_input: Selector::css(
                "input[aria-label*='Maximum Value'], input[aria-label*='Maximum']",
            ),
            price_submit: Selector::css(
                "button[aria-label='Submit price range'], button[type='submit']",
            ),
        }
    }
}

impl Default for ProductSelectors {
    fn default() -> Self {
        Self {
            add_to_cart: Selector::xpath(
                "//a[contains(@href, 'addtocart')] | //button[contains(normalize-space(.), 'Add to cart')]",
            ),
            size_select: Selector::css("select[id*='msku-ds-SELECT_SIZE']"),
            color_select: Selector::css("select[id*='msku-ds-SELECT_COLOR']"),
            option: Selector::css("option"),
            variant_buttons: Selector::css("div.msku-variant button"),
            popup_close: Selector::css("button[aria-label='Close']"),
        }
    }
}

impl Default for CartSelectors {
    fn default() -> Self {
        Self {
            items: Selector::css("div.item-container"),
            subtotal: Selector::css("div[data-test-id='SUB_TOTAL'] span.value"),
            total: Selector::css("div[data-test-id='TOTAL'] span.value"),
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_screenshots_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_true() -> bool {
    true
}
