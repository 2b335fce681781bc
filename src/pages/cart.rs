use crate::config::CartSelectors;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::pages::{BasePage, PageContext};
use crate::parsers::price;

/// The shopping cart
///
/// Nothing is cached: every query reads the remote cart again.
pub struct CartPage<D: Driver> {
    base: BasePage<D>,
    url: String,
    selectors: CartSelectors,
}

impl<D: Driver> CartPage<D> {
    pub fn new(ctx: &PageContext<D>) -> Self {
        Self {
            base: BasePage::new(ctx),
            url: ctx.config.site.cart_url.clone(),
            selectors: ctx.config.selectors.cart.clone(),
        }
    }

    pub fn base(&self) -> &BasePage<D> {
        &self.base
    }

    pub async fn open_cart(&self) -> Result<()> {
        self.base.report().step("Open cart");
        self.base.navigate_to(&self.url).await?;
        self.base
            .settle(Some(&self.selectors.items), self.base.timeouts().short_settle())
            .await;
        Ok(())
    }

    /// Cart total, falling back to the subtotal; `0.0` when neither is shown
    pub async fn get_cart_total(&self) -> f64 {
        self.base.report().step("Get cart total");
        match self.try_cart_total().await {
            Ok(total) => total,
            Err(e) => {
                ::log::error!("Error getting cart total: {}", e);
                0.0
            }
        }
    }

    pub async fn try_cart_total(&self) -> Result<f64> {
        if self.base.is_visible(&self.selectors.total).await {
            let total = price::extract_price(&self.base.get_text(&self.selectors.total).await?);
            ::log::info!("Cart total: ${}", total);
            return Ok(total);
        }

        if self.base.is_visible(&self.selectors.subtotal).await {
            let subtotal =
                price::extract_price(&self.base.get_text(&self.selectors.subtotal).await?);
            ::log::info!("Cart subtotal: ${}", subtotal);
            return Ok(subtotal);
        }

        Err(Error::NotFound("cart total or subtotal".to_string()))
    }

    /// Number of rows in the cart; `0` on failure
    pub async fn get_items_count(&self) -> usize {
        self.base.report().step("Get cart items count");
        match self.base.all(&self.selectors.items).await {
            Ok(items) => {
                ::log::info!("Items in cart: {}", items.len());
                items.len()
            }
            Err(e) => {
                ::log::debug!("Could not count cart items: {}", e);
                0
            }
        }
    }

    /// Fails with both values in the message iff the total exceeds `budget`
    pub async fn assert_total_not_exceeds(&self, budget: f64) -> Result<()> {
        self.base
            .report()
            .step(format!("Assert cart total not exceeds ${}", budget));
        let total = self.get_cart_total().await;

        ::log::info!("Budget: ${}, Actual: ${}", budget, total);
        if total > budget {
            return Err(Error::Assertion(format!(
                "Cart total ${} exceeds budget ${}",
                total, budget
            )));
        }

        ::log::info!("Cart total is within budget!");
        Ok(())
    }
}
