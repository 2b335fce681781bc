pub mod base;
pub mod cart;
pub mod home;
pub mod product;
pub mod search_results;

#[cfg(test)]
pub(crate) mod tests;

pub use base::BasePage;
pub use cart::CartPage;
pub use home::HomePage;
pub use product::ProductPage;
pub use search_results::SearchResultsPage;

use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::report::Report;
use std::sync::Arc;

/// What every page object of a scenario shares: the page, the suite
/// configuration and the report sink
pub struct PageContext<D: Driver> {
    pub driver: Arc<D>,
    pub config: Arc<SuiteConfig>,
    pub report: Report,
}

impl<D: Driver> PageContext<D> {
    pub fn new(driver: Arc<D>, config: Arc<SuiteConfig>, report: Report) -> Self {
        Self {
            driver,
            config,
            report,
        }
    }
}

impl<D: Driver> Clone for PageContext<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            config: Arc::clone(&self.config),
            report: self.report.clone(),
        }
    }
}
