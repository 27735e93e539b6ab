//! Product catalog repository.

use sqlx::PgPool;

use shopsync_core::{CurrencyCode, Price, ProductId};

use super::RepositoryError;
use crate::models::Product;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    brand: String,
    price_minor: i64,
    currency: String,
    image_url: String,
    purchase_url: String,
    category: String,
    rating: f64,
    review_count: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        product_from_parts(
            row.id,
            row.name,
            row.brand,
            row.price_minor,
            &row.currency,
            row.image_url,
            row.purchase_url,
            row.category,
            row.rating,
            row.review_count,
        )
    }
}

/// Assemble a [`Product`] from row parts, normalizing the stored currency
/// code into a typed price.
#[allow(clippy::too_many_arguments)]
pub(super) fn product_from_parts(
    id: ProductId,
    name: String,
    brand: String,
    price_minor: i64,
    currency: &str,
    image_url: String,
    purchase_url: String,
    category: String,
    rating: f64,
    review_count: i32,
) -> Result<Product, RepositoryError> {
    let currency = CurrencyCode::from_code(currency).ok_or_else(|| {
        RepositoryError::DataCorruption(format!("unknown currency code in database: {currency}"))
    })?;
    let price = Price::from_minor_units(price_minor, currency);

    Ok(Product {
        id,
        name,
        brand,
        price,
        price_display: price.display(),
        image_url,
        purchase_url,
        category,
        rating,
        review_count,
    })
}

/// Repository for product catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown currency code.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, brand, price_minor, currency, image_url,
                   purchase_url, category, rating, review_count
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown currency code.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, brand, price_minor, currency, image_url,
                   purchase_url, category, rating, review_count
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }
}
