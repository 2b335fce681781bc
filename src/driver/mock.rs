//! In-memory driver for page-object tests
//!
//! Pages are keyed by URL and expose elements keyed by the raw selector text
//! the page objects ask for. Interactions are recorded so tests can assert on
//! what was clicked, filled and selected.

use crate::driver::{Driver, Session};
use crate::error::{Error, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An interaction the page objects performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    Scroll(String),
    Click(String),
    Fill(String, String),
    Select(String, String),
    Screenshot,
}

/// A simulated element
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub name: String,
    pub text: Option<String>,
    pub attrs: HashMap<String, String>,
    pub hidden: bool,
    pub children: HashMap<String, Vec<Arc<MockElement>>>,
    /// URL loaded when the element is clicked
    pub navigates_to: Option<String>,
    /// Clicking fails
    pub broken: bool,
}

impl MockElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn navigates_to(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }

    pub fn child(mut self, selector: &Selector, child: MockElement) -> Self {
        self.children
            .entry(String::from(selector.clone()))
            .or_default()
            .push(Arc::new(child));
        self
    }
}

/// A simulated document
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub title: String,
    pub content: String,
    pub elements: HashMap<String, Vec<Arc<MockElement>>>,
    /// Selectors whose lookup raises a driver error
    pub failing: HashSet<String>,
}

impl MockPage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: format!("<html><head><title>{}</title></head><body></body></html>", title),
            ..Self::default()
        }
    }

    pub fn content(mut self, html: &str) -> Self {
        self.content = html.to_string();
        self
    }

    pub fn with(mut self, selector: &Selector, element: MockElement) -> Self {
        self.elements
            .entry(String::from(selector.clone()))
            .or_default()
            .push(Arc::new(element));
        self
    }

    pub fn failing(mut self, selector: &Selector) -> Self {
        self.failing.insert(String::from(selector.clone()));
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<String, MockPage>,
    /// URLs whose navigation fails
    unreachable: HashSet<String>,
    current: String,
    actions: Vec<Action>,
}

/// In-memory `Driver`
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page under `url`
    pub fn page(self, url: &str, page: MockPage) -> Self {
        self.lock().pages.insert(url.to_string(), page);
        self
    }

    /// Make navigation to `url` fail
    pub fn unreachable(self, url: &str) -> Self {
        self.lock().unreachable.insert(url.to_string());
        self
    }

    /// Start at `url` without recording a navigation
    pub fn at(self, url: &str) -> Self {
        self.lock().current = url.to_string();
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.lock().actions.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Click(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, action: Action) {
        self.lock().actions.push(action);
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Element = Arc<MockElement>;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        if state.unreachable.contains(url) {
            return Err(Error::Driver(format!("net::ERR_CONNECTION_REFUSED at {}", url)));
        }
        state.current = url.to_string();
        state.actions.push(Action::Navigate(url.to_string()));
        Ok(())
    }

    async fn locate(&self, selector: &Selector) -> Result<Vec<Arc<MockElement>>> {
        let state = self.lock();
        let key = String::from(selector.clone());
        let Some(page) = state.pages.get(&state.current) else {
            return Ok(Vec::new());
        };
        if page.failing.contains(&key) {
            return Err(Error::Driver(format!("invalid selector: {}", key)));
        }
        Ok(page.elements.get(&key).cloned().unwrap_or_default())
    }

    async fn locate_within(
        &self,
        parent: &Arc<MockElement>,
        selector: &Selector,
    ) -> Result<Vec<Arc<MockElement>>> {
        let key = String::from(selector.clone());
        Ok(parent.children.get(&key).cloned().unwrap_or_default())
    }

    async fn scroll_into_view(&self, element: &Arc<MockElement>) -> Result<()> {
        self.record(Action::Scroll(element.name.clone()));
        Ok(())
    }

    async fn click(&self, element: &Arc<MockElement>) -> Result<()> {
        if element.broken || element.hidden {
            return Err(Error::Driver(format!(
                "element not interactable: {}",
                element.name
            )));
        }
        let mut state = self.lock();
        state.actions.push(Action::Click(element.name.clone()));
        if let Some(url) = &element.navigates_to {
            state.current = url.clone();
        }
        Ok(())
    }

    async fn fill(&self, element: &Arc<MockElement>, text: &str) -> Result<()> {
        self.record(Action::Fill(element.name.clone(), text.to_string()));
        Ok(())
    }

    async fn text(&self, element: &Arc<MockElement>) -> Result<String> {
        element
            .text
            .clone()
            .ok_or_else(|| Error::NotFound(format!("text of {}", element.name)))
    }

    async fn attr(&self, element: &Arc<MockElement>, name: &str) -> Result<Option<String>> {
        Ok(element.attrs.get(name).cloned())
    }

    async fn is_visible(&self, element: &Arc<MockElement>) -> Result<bool> {
        Ok(!element.hidden)
    }

    async fn select_value(&self, element: &Arc<MockElement>, value: &str) -> Result<()> {
        self.record(Action::Select(element.name.clone(), value.to_string()));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record(Action::Screenshot);
        Ok(b"\x89PNG mock".to_vec())
    }

    async fn page_content(&self) -> Result<String> {
        let state = self.lock();
        Ok(state
            .pages
            .get(&state.current)
            .map(|p| p.content.clone())
            .unwrap_or_default())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.lock().current.clone())
    }

    async fn title(&self) -> Result<String> {
        let state = self.lock();
        Ok(state
            .pages
            .get(&state.current)
            .map(|p| p.title.clone())
            .unwrap_or_default())
    }
}

type PageFactory = Box<dyn Fn() -> MockDriver + Send + Sync>;

/// Session handing out a fresh `MockDriver` per page
pub struct MockSession {
    factory: PageFactory,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl MockSession {
    pub fn new(factory: impl Fn() -> MockDriver + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Session for MockSession {
    type Page = MockDriver;

    async fn open_page(&self) -> Result<MockDriver> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok((self.factory)())
    }

    async fn close_page(&self, _page: &MockDriver) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
