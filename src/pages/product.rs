use crate::config::ProductSelectors;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::pages::{BasePage, PageContext};
use crate::selector::Selector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A single listing's page
pub struct ProductPage<D: Driver> {
    base: BasePage<D>,
    selectors: ProductSelectors,
    rng: StdRng,
}

impl<D: Driver> ProductPage<D> {
    pub fn new(ctx: &PageContext<D>) -> Self {
        let rng = match ctx.config.variant_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            base: BasePage::new(ctx),
            selectors: ctx.config.selectors.product.clone(),
            rng,
        }
    }

    pub fn base(&self) -> &BasePage<D> {
        &self.base
    }

    pub async fn open_product(&self, url: &str) -> Result<()> {
        self.base.report().step(format!("Open product: {}", url));
        self.base.navigate_to(url).await?;
        self.base
            .settle(Some(&self.selectors.add_to_cart), self.base.timeouts().short_settle())
            .await;
        Ok(())
    }

    /// Pick a random size, color and variant button
    ///
    /// Each mechanism is tried independently of the others' outcome.
    pub async fn select_random_variants(&mut self) {
        self.base.report().step("Select random variants");

        for (label, selector) in [
            ("size", self.selectors.size_select.clone()),
            ("color", self.selectors.color_select.clone()),
        ] {
            if !self.base.is_visible(&selector).await {
                continue;
            }
            ::log::info!("Selecting random {}...", label);
            match self.select_random_option(&selector).await {
                Ok(Some(option)) => ::log::info!("Selected option: {}", option),
                Ok(None) => ::log::debug!("No {} options to choose from", label),
                Err(e) => ::log::error!("Could not select option: {}", e),
            }
        }

        if let Err(e) = self.click_random_variant_button().await {
            ::log::debug!("Could not click a variant button: {}", e);
        }
    }

    /// Choose a random non-placeholder option of a `<select>`
    ///
    /// The first option is treated as a placeholder, and options without a
    /// value are skipped. Returns the chosen option's text.
    pub async fn select_random_option(&mut self, select: &Selector) -> Result<Option<String>> {
        let limit = self.base.timeouts().interaction();
        let element = self.base.first(select).await?;
        let options = self
            .base
            .bounded(
                select.as_str(),
                limit,
                self.base.driver().locate_within(&element, &self.selectors.option),
            )
            .await?;

        let mut valid = Vec::new();
        for option in options.iter().skip(1) {
            if let Some(value) = self.base.element_attr(option, "value").await? {
                if !value.is_empty() {
                    valid.push((option, value));
                }
            }
        }

        let Some((option, value)) = valid.choose(&mut self.rng) else {
            return Ok(None);
        };

        self.base
            .bounded(
                select.as_str(),
                limit,
                self.base.driver().select_value(&element, value),
            )
            .await?;
        let text = self
            .base
            .element_text(option, "option", limit)
            .await
            .unwrap_or_else(|_| value.clone());
        Ok(Some(text))
    }

    async fn click_random_variant_button(&mut self) -> Result<bool> {
        let buttons = self.base.all(&self.selectors.variant_buttons).await?;
        let Some(button) = buttons.choose(&mut self.rng) else {
            return Ok(false);
        };
        self.base
            .click_element(button, self.selectors.variant_buttons.as_str())
            .await?;
        Ok(true)
    }

    /// Click add-to-cart and dismiss the confirmation popup
    ///
    /// Returns `false` when anything along the way failed; the failure is
    /// logged, not raised.
    pub async fn add_to_cart(&self) -> bool {
        self.base.report().step("Add item to cart");
        match self.try_add_to_cart().await {
            Ok(()) => {
                ::log::info!("Item added to cart successfully");
                true
            }
            Err(e) => {
                ::log::error!("Failed to add to cart: {}", e);
                false
            }
        }
    }

    pub async fn try_add_to_cart(&self) -> Result<()> {
        self.base.wait_for_visible(&self.selectors.add_to_cart).await?;
        self.base.click(&self.selectors.add_to_cart).await?;
        self.base
            .settle(
                Some(&self.selectors.popup_close),
                self.base.timeouts().short_settle(),
            )
            .await;

        if self.base.is_visible(&self.selectors.popup_close).await {
            self.base
                .click(&self.selectors.popup_close)
                .await
                .map_err(|e| Error::Driver(format!("closing cart popup: {}", e)))?;
        }
        Ok(())
    }
}
