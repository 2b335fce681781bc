use crate::config::ScenarioRecord;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::pages::{CartPage, HomePage, PageContext, ProductPage, SearchResultsPage};
use crate::report::Report;

/// What to search for and how much to spend per item
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    query: String,
    max_price: f64,
    limit: usize,
}

impl SearchCriteria {
    /// Rejects non-positive prices and a zero limit
    pub fn new(query: impl Into<String>, max_price: f64, limit: usize) -> Result<Self> {
        if !(max_price.is_finite() && max_price > 0.0) {
            return Err(Error::InvalidCriteria(format!(
                "max price must be positive, got {}",
                max_price
            )));
        }
        if limit == 0 {
            return Err(Error::InvalidCriteria(
                "items limit must be positive".to_string(),
            ));
        }
        Ok(Self {
            query: query.into(),
            max_price,
            limit,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_price(&self) -> f64 {
        self.max_price
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Which phases a scenario runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    /// Search, add to cart, check the cart against the budget
    FullFlow,
    /// Search only, expecting at least one result
    SearchOnly,
}

/// A named scenario of the suite
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub criteria: SearchCriteria,
    pub kind: ScenarioKind,
}

impl Scenario {
    pub fn full_flow(name: impl Into<String>, criteria: SearchCriteria) -> Self {
        let description = format!(
            "Search {} under ${}, add to cart, verify budget",
            criteria.query(),
            criteria.max_price()
        );
        Self {
            name: name.into(),
            description,
            criteria,
            kind: ScenarioKind::FullFlow,
        }
    }

    /// A search-only scenario from one record of the data file
    pub fn from_record(index: usize, record: &ScenarioRecord) -> Result<Self> {
        let criteria = SearchCriteria::new(
            record.search_query.clone(),
            record.max_price,
            record.items_limit,
        )?;
        Ok(Self {
            name: format!("data_driven_search[{}-{}]", index, record.search_query),
            description: record.description.clone(),
            criteria,
            kind: ScenarioKind::SearchOnly,
        })
    }
}

/// The page objects of one scenario, composed into the shopping flow
pub struct ShoppingFlow<D: Driver> {
    home: HomePage<D>,
    search: SearchResultsPage<D>,
    product: ProductPage<D>,
    cart: CartPage<D>,
    report: Report,
}

impl<D: Driver> ShoppingFlow<D> {
    pub fn new(ctx: &PageContext<D>) -> Self {
        Self {
            home: HomePage::new(ctx),
            search: SearchResultsPage::new(ctx),
            product: ProductPage::new(ctx),
            cart: CartPage::new(ctx),
            report: ctx.report.clone(),
        }
    }

    pub async fn run(&mut self, scenario: &Scenario) -> Result<()> {
        match scenario.kind {
            ScenarioKind::FullFlow => self.run_full(&scenario.criteria).await,
            ScenarioKind::SearchOnly => self.run_search_only(&scenario.criteria).await,
        }
    }

    /// Search, add every found item to the cart, then check the budget
    pub async fn run_full(&mut self, criteria: &SearchCriteria) -> Result<()> {
        let urls = self.search_items_by_name_under_price(criteria).await?;
        if urls.is_empty() {
            return Err(Error::Assertion("No items found!".to_string()));
        }

        self.add_items_to_cart(&urls).await;
        self.assert_cart_total_not_exceeds(criteria.max_price(), urls.len())
            .await
    }

    pub async fn run_search_only(&mut self, criteria: &SearchCriteria) -> Result<()> {
        let urls = self.search_items_by_name_under_price(criteria).await?;
        if urls.is_empty() {
            return Err(Error::Assertion(format!(
                "No items found for '{}'",
                criteria.query()
            )));
        }
        ::log::info!("Search for '{}' found {} items", criteria.query(), urls.len());
        Ok(())
    }

    /// Search and collect up to `limit` item URLs priced under `max_price`
    pub async fn search_items_by_name_under_price(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<String>> {
        self.report.step(format!(
            "Search for '{}' under ${}",
            criteria.query(),
            criteria.max_price()
        ));

        self.home.open().await?;
        self.home.search_item(criteria.query()).await?;
        self.search.apply_price_filter(criteria.max_price()).await;

        let urls = self
            .search
            .get_items_under_price(criteria.max_price(), criteria.limit())
            .await;
        ::log::info!("Found {} items under ${}", urls.len(), criteria.max_price());

        let name = format!("search_results_{}", criteria.query());
        if let Err(e) = self.search.base().take_screenshot(Some(&name)).await {
            ::log::error!("Could not capture search results: {}", e);
        }
        Ok(urls)
    }

    /// Open each URL, pick random variants and add it to the cart
    ///
    /// Items that cannot be added are logged and skipped.
    pub async fn add_items_to_cart(&mut self, urls: &[String]) {
        self.report.step(format!("Add {} items to cart", urls.len()));

        for (index, url) in urls.iter().enumerate() {
            let index = index + 1;
            ::log::info!("Adding item {}/{} to cart...", index, urls.len());

            match self.add_item(url).await {
                Ok(true) => {
                    self.screenshot(&format!("item_{}_added_to_cart", index))
                        .await;
                    ::log::info!("Item {} added successfully", index);
                }
                Ok(false) => ::log::error!("Failed to add item {}", index),
                Err(e) => {
                    ::log::error!("Error adding item {}: {}", index, e);
                    self.screenshot(&format!("item_{}_error", index)).await;
                }
            }
        }
    }

    async fn add_item(&mut self, url: &str) -> Result<bool> {
        self.product.open_product(url).await?;
        self.product.select_random_variants().await;
        Ok(self.product.add_to_cart().await)
    }

    /// Open the cart and check its total against `budget_per_item * items_count`
    pub async fn assert_cart_total_not_exceeds(
        &self,
        budget_per_item: f64,
        items_count: usize,
    ) -> Result<()> {
        let total_budget = budget_per_item * items_count as f64;
        self.report
            .step(format!("Assert cart total <= ${}", total_budget));

        self.cart.open_cart().await?;
        let rows = self.cart.get_items_count().await;
        ::log::info!("{} cart rows for {} items added", rows, items_count);
        let verdict = self.cart.assert_total_not_exceeds(total_budget).await;
        self.screenshot("cart_final").await;
        verdict
    }

    /// Screenshot of the failing page, taken before the page is released
    pub async fn capture_failure(&self, scenario: &str) {
        self.screenshot(&format!("failure_{}", scenario)).await;
    }

    async fn screenshot(&self, name: &str) {
        if let Err(e) = self.product.base().take_screenshot(Some(name)).await {
            ::log::error!("Could not capture {}: {}", name, e);
        }
    }
}
