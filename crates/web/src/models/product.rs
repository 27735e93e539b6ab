//! Product catalog domain types.

use serde::Serialize;

use shopsync_core::{Price, ProductId, ProductRef};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Brand, e.g. "Nike".
    pub brand: String,
    /// Unit price in integer minor units.
    pub price: Price,
    /// Formatted price for display, e.g. "₹4999.00".
    pub price_display: String,
    /// Product image URL.
    pub image_url: String,
    /// External purchase URL.
    pub purchase_url: String,
    /// Category, e.g. "Footwear".
    pub category: String,
    /// Average rating out of 5.
    pub rating: f64,
    /// Number of reviews behind the rating.
    pub review_count: i32,
}

impl Product {
    /// The boundary shape handed to the cart engine.
    #[must_use]
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id,
            name: self.name.clone(),
            brand: self.brand.clone(),
            unit_price: self.price,
            image_url: self.image_url.clone(),
            purchase_url: self.purchase_url.clone(),
        }
    }
}
