//! Demo-data seeding command.
//!
//! Inserts a small catalog and a handful of published blog posts so the API
//! has something to serve on a fresh database. Idempotent: every insert is
//! an upsert keyed on the natural unique column.

use rust_decimal::Decimal;

use super::CommandError;

struct SeedProduct {
    category_slug: &'static str,
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price: &'static str,
}

struct SeedPost {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    body: &'static str,
    tags: &'static [&'static str],
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Footwear", "footwear"),
    ("Apparel", "apparel"),
    ("Accessories", "accessories"),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category_slug: "footwear",
        name: "Trail Runner",
        slug: "trail-runner",
        description: "Lightweight trail running shoe with a grippy outsole.",
        price: "74.99",
    },
    SeedProduct {
        category_slug: "footwear",
        name: "City Loafer",
        slug: "city-loafer",
        description: "Everyday leather loafer.",
        price: "59.50",
    },
    SeedProduct {
        category_slug: "apparel",
        name: "Rain Shell",
        slug: "rain-shell",
        description: "Packable waterproof shell jacket.",
        price: "120.00",
    },
    SeedProduct {
        category_slug: "accessories",
        name: "Canvas Tote",
        slug: "canvas-tote",
        description: "Heavy canvas tote bag.",
        price: "18.00",
    },
];

const POSTS: &[SeedPost] = &[
    SeedPost {
        slug: "caring-for-leather-shoes",
        title: "Caring for Leather Shoes",
        description: "Keep your loafers alive for a decade.",
        body: "Condition the leather every few months and rotate pairs so \
               each one gets a day to dry out.",
        tags: &["footwear", "care"],
    },
    SeedPost {
        slug: "layering-for-wet-weather",
        title: "Layering for Wet Weather",
        description: "A shell is only the outer third of the answer.",
        body: "Start with a wicking base layer, add insulation that stays \
               warm when damp, and keep the shell vented.",
        tags: &["apparel", "care", "weather"],
    },
    SeedPost {
        slug: "what-to-pack-for-a-day-hike",
        title: "What to Pack for a Day Hike",
        description: "The tote is not the right bag, but we love it anyway.",
        body: "Water, a shell, something salty, and shoes that have already \
               seen a trail or two.",
        tags: &["weather", "footwear"],
    },
];

/// Seed the database with demo data.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Seeding categories...");
    for (name, slug) in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) \
             ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(name)
        .bind(slug)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding products...");
    for product in PRODUCTS {
        let price: Decimal = product.price.parse().unwrap_or(Decimal::ZERO);

        sqlx::query(
            "INSERT INTO products (category_id, name, slug, description, price) \
             SELECT c.id, $2, $3, $4, $5 FROM categories c WHERE c.slug = $1 \
             ON CONFLICT DO NOTHING",
        )
        .bind(product.category_slug)
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(price)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding blog posts...");
    for post in POSTS {
        sqlx::query(
            "INSERT INTO posts (slug, title, description, body, status) \
             VALUES ($1, $2, $3, $4, 'published') \
             ON CONFLICT (slug) DO UPDATE SET \
                 title = EXCLUDED.title, \
                 description = EXCLUDED.description, \
                 body = EXCLUDED.body",
        )
        .bind(post.slug)
        .bind(post.title)
        .bind(post.description)
        .bind(post.body)
        .execute(&pool)
        .await?;

        for tag in post.tags {
            sqlx::query(
                "INSERT INTO tags (name, slug) VALUES ($1, $1) ON CONFLICT DO NOTHING",
            )
            .bind(tag)
            .execute(&pool)
            .await?;

            sqlx::query(
                "INSERT INTO post_tags (post_id, tag_id) \
                 SELECT p.id, t.id FROM posts p, tags t \
                 WHERE p.slug = $1 AND t.slug = $2 \
                 ON CONFLICT DO NOTHING",
            )
            .bind(post.slug)
            .bind(tag)
            .execute(&pool)
            .await?;
        }
    }

    tracing::info!("Seeding complete!");
    Ok(())
}
