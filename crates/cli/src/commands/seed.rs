//! Seed the brand channels and product catalog.
//!
//! Idempotent: channels upsert on slug, products are inserted only when
//! the catalog is empty, and channel/product links upsert on the pair.
//! Safe to re-run after adding new channels to the lists below.

use sqlx::PgPool;

use super::CommandError;

struct ChannelSeed {
    slug: &'static str,
    name: &'static str,
    logo: &'static str,
    category: &'static str,
    description: &'static str,
    trending_score: i32,
}

struct ProductSeed {
    name: &'static str,
    brand: &'static str,
    price_minor: i64,
    image_url: &'static str,
    purchase_url: &'static str,
    category: &'static str,
    rating: f64,
    review_count: i32,
}

const CHANNELS: &[ChannelSeed] = &[
    ChannelSeed {
        slug: "zara",
        name: "Zara",
        logo: "🛍️",
        category: "Fashion",
        description: "Latest drops and trending styles",
        trending_score: 25,
    },
    ChannelSeed {
        slug: "nike",
        name: "Nike",
        logo: "👟",
        category: "Sportswear",
        description: "New releases and limited editions",
        trending_score: 42,
    },
    ChannelSeed {
        slug: "hm",
        name: "H&M",
        logo: "👕",
        category: "Fast Fashion",
        description: "Affordable fashion and weekly updates",
        trending_score: 18,
    },
    ChannelSeed {
        slug: "adidas",
        name: "Adidas",
        logo: "⚡",
        category: "Sportswear",
        description: "Athletic wear and lifestyle collection",
        trending_score: 31,
    },
    ChannelSeed {
        slug: "uniqlo",
        name: "Uniqlo",
        logo: "🎯",
        category: "Basics",
        description: "Quality essentials and innovative fabrics",
        trending_score: 12,
    },
    ChannelSeed {
        slug: "gucci",
        name: "Gucci",
        logo: "✨",
        category: "Luxury",
        description: "High-end fashion and exclusive pieces",
        trending_score: 8,
    },
];

// Prices are minor units (paise): ₹3,999.00 -> 399_900.
const PRODUCTS: &[ProductSeed] = &[
    ProductSeed {
        name: "Oversized Denim Jacket",
        brand: "Zara",
        price_minor: 399_900,
        image_url: "https://images.unsplash.com/photo-1544966503-7cc5ac882d5f?w=400",
        purchase_url: "https://www.zara.com/in/oversized-denim-jacket",
        category: "Outerwear",
        rating: 4.5,
        review_count: 234,
    },
    ProductSeed {
        name: "Oversized Wool Blazer",
        brand: "Zara",
        price_minor: 499_900,
        image_url: "https://images.unsplash.com/photo-1594633312681-425c7b97ccd1?w=400",
        purchase_url: "https://www.zara.com/in/oversized-wool-blazer",
        category: "Outerwear",
        rating: 4.5,
        review_count: 128,
    },
    ProductSeed {
        name: "Classic White Sneakers",
        brand: "Nike",
        price_minor: 729_900,
        image_url: "https://images.unsplash.com/photo-1549298916-b41d501d3772?w=400",
        purchase_url: "https://www.nike.com/in/classic-white-sneakers",
        category: "Footwear",
        rating: 4.8,
        review_count: 512,
    },
    ProductSeed {
        name: "Minimalist Backpack",
        brand: "Uniqlo",
        price_minor: 249_900,
        image_url: "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=400",
        purchase_url: "https://www.uniqlo.com/in/minimalist-backpack",
        category: "Accessories",
        rating: 4.6,
        review_count: 89,
    },
];

/// Seed channels and products.
///
/// # Errors
///
/// Returns `CommandError` if the environment is incomplete or an insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    seed_channels(&pool).await?;
    seed_products(&pool).await?;
    link_products_to_channels(&pool).await?;

    tracing::info!("Seeding complete!");
    Ok(())
}

async fn seed_channels(pool: &PgPool) -> Result<(), CommandError> {
    for channel in CHANNELS {
        sqlx::query(
            r"
            INSERT INTO channels (slug, name, logo, category, description, trending_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name,
                logo = EXCLUDED.logo,
                category = EXCLUDED.category,
                description = EXCLUDED.description,
                trending_score = EXCLUDED.trending_score
            ",
        )
        .bind(channel.slug)
        .bind(channel.name)
        .bind(channel.logo)
        .bind(channel.category)
        .bind(channel.description)
        .bind(channel.trending_score)
        .execute(pool)
        .await?;
    }

    tracing::info!(channels = CHANNELS.len(), "channels seeded");
    Ok(())
}

async fn seed_products(pool: &PgPool) -> Result<(), CommandError> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "catalog already populated, skipping products");
        return Ok(());
    }

    for product in PRODUCTS {
        sqlx::query(
            r"
            INSERT INTO products
                (name, brand, price_minor, currency, image_url,
                 purchase_url, category, rating, review_count)
            VALUES ($1, $2, $3, 'INR', $4, $5, $6, $7, $8)
            ",
        )
        .bind(product.name)
        .bind(product.brand)
        .bind(product.price_minor)
        .bind(product.image_url)
        .bind(product.purchase_url)
        .bind(product.category)
        .bind(product.rating)
        .bind(product.review_count)
        .execute(pool)
        .await?;
    }

    tracing::info!(products = PRODUCTS.len(), "products seeded");
    Ok(())
}

/// Put every product into its brand's channel feed.
async fn link_products_to_channels(pool: &PgPool) -> Result<(), CommandError> {
    sqlx::query(
        r"
        INSERT INTO channel_products (channel_id, product_id)
        SELECT ch.id, p.id
        FROM products p
        JOIN channels ch ON ch.name = p.brand
        ON CONFLICT (channel_id, product_id) DO NOTHING
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}
