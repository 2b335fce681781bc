use crate::config::{BrowserConfig, BrowserKind, SuiteConfig};
use crate::driver::{Driver, Session};
use crate::error::{Error, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::{Capabilities, WindowHandle};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;

/// WebDriver endpoints tried when the configured one refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// One WebDriver session shared by every scenario of a run
pub struct WebDriverSession {
    client: Client,
    /// The window the session started with; kept open so new windows can be
    /// created after a scenario's window is closed
    home_window: WindowHandle,
    browser: BrowserConfig,
}

/// A browser window owned by a single scenario
pub struct WebDriverPage {
    client: Client,
    window: WindowHandle,
    slow_mo: Duration,
}

impl WebDriverSession {
    /// Connects to the configured WebDriver server, falling back to common
    /// local endpoints
    pub async fn connect(config: &SuiteConfig) -> Result<Self> {
        let capabilities = capabilities(&config.browser);
        let client = connect_to_webdriver(&config.webdriver_url, &capabilities).await?;

        let home_window = client.window().await?;
        ::log::info!(
            "Started {:?} session (headless: {}, locale: {}, timezone: {})",
            config.browser.kind,
            config.browser.headless,
            config.browser.locale,
            config.browser.timezone
        );

        Ok(Self {
            client,
            home_window,
            browser: config.browser.clone(),
        })
    }

    /// Ends the WebDriver session
    pub async fn close(self) -> Result<()> {
        ::log::info!("Closing browser session");
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl Session for WebDriverSession {
    type Page = WebDriverPage;

    async fn open_page(&self) -> Result<WebDriverPage> {
        let created = self.client.new_window(true).await?;
        self.client.switch_to_window(created.handle.clone()).await?;

        let viewport = self.browser.viewport;
        if let Err(e) = self
            .client
            .set_window_size(viewport.width, viewport.height)
            .await
        {
            ::log::warn!("Could not resize window to {:?}: {}", viewport, e);
        }

        ::log::debug!("Opened page window {:?}", created.handle);
        Ok(WebDriverPage {
            client: self.client.clone(),
            window: created.handle,
            slow_mo: Duration::from_millis(self.browser.slow_mo_ms),
        })
    }

    async fn close_page(&self, page: &WebDriverPage) -> Result<()> {
        self.client.switch_to_window(page.window.clone()).await?;
        self.client.close_window().await?;
        self.client
            .switch_to_window(self.home_window.clone())
            .await?;
        ::log::debug!("Closed page window {:?}", page.window);
        Ok(())
    }
}

impl WebDriverPage {
    async fn pause(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }
}

#[async_trait]
impl Driver for WebDriverPage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.pause().await;
        self.client.goto(url).await?;
        Ok(())
    }

    async fn locate(&self, selector: &Selector) -> Result<Vec<Element>> {
        Ok(self.client.find_all(selector.locator()).await?)
    }

    async fn locate_within(&self, parent: &Element, selector: &Selector) -> Result<Vec<Element>> {
        Ok(parent.find_all(selector.locator()).await?)
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        let args = vec![serde_json::to_value(element)?];
        self.client
            .execute(
                "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});",
                args,
            )
            .await?;
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        self.pause().await;
        element.click().await?;
        Ok(())
    }

    async fn fill(&self, element: &Element, text: &str) -> Result<()> {
        self.pause().await;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(element.text().await?)
    }

    async fn attr(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn is_visible(&self, element: &Element) -> Result<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn select_value(&self, element: &Element, value: &str) -> Result<()> {
        self.pause().await;
        element.select_by_value(value).await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    async fn page_content(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }
}

/// Builds WebDriver capabilities for the configured browser
pub fn capabilities(browser: &BrowserConfig) -> Capabilities {
    let size = format!("{},{}", browser.viewport.width, browser.viewport.height);
    let value = match browser.kind {
        BrowserKind::Chromium => {
            let mut args = vec![
                format!("--window-size={}", size),
                format!("--lang={}", browser.locale),
            ];
            if browser.headless {
                args.push("--headless=new".to_string());
            }
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": args,
                    "prefs": { "intl.accept_languages": browser.locale },
                },
            })
        }
        BrowserKind::Firefox => {
            let mut args = vec![
                format!("--width={}", browser.viewport.width),
                format!("--height={}", browser.viewport.height),
            ];
            if browser.headless {
                args.push("-headless".to_string());
            }
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": {
                    "args": args,
                    "prefs": { "intl.accept_languages": browser.locale },
                },
            })
        }
        BrowserKind::Webkit => {
            if browser.headless {
                ::log::warn!("WebKit driver has no headless mode, running headed");
            }
            json!({ "browserName": "safari" })
        }
    };

    match value {
        serde_json::Value::Object(map) => map,
        _ => Capabilities::new(),
    }
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str, capabilities: &Capabilities) -> Result<Client> {
    // Try to connect to the specified WebDriver URL
    match ClientBuilder::native()
        .capabilities(capabilities.clone())
        .connect(webdriver_url)
        .await
    {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native()
            .capabilities(capabilities.clone())
            .connect(url)
            .await
        {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(Error::Driver(format!(
        "failed to connect to any WebDriver server (tried {})",
        webdriver_url
    )))
}
