pub mod html;
pub mod price;


pub use html::{PageSignals, inspect};
pub use price::{extract_price, is_price_valid};
