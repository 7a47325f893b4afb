//! Demo data seeding.
//!
//! # Usage
//!
//! ```bash
//! farm-village-cli seed
//! ```
//!
//! Creates a demo buyer, two demo sellers with verified listings, and one
//! pending listing for exercising the moderation queue. Re-running is safe:
//! existing accounts are skipped via `ON CONFLICT DO NOTHING`.
//!
//! All demo accounts share the password `growing-season`.

use rust_decimal::Decimal;
use sqlx::PgPool;

use farm_village_core::Role;

use super::CommandError;
use super::admin::hash_password;

const DEMO_PASSWORD: &str = "growing-season";

struct DemoAccount {
    username: &'static str,
    role: Role,
    display_name: &'static str,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        username: "ayesha",
        role: Role::Buyer,
        display_name: "Ayesha Rahman",
    },
    DemoAccount {
        username: "karim-farm",
        role: Role::Seller,
        display_name: "Karim's Farm",
    },
    DemoAccount {
        username: "green-valley",
        role: Role::Seller,
        display_name: "Green Valley Produce",
    },
];

struct DemoProduct {
    seller: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    /// Price in cents.
    unit_price_cents: i64,
    quantity: i32,
    verified: bool,
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        seller: "karim-farm",
        name: "Fresh Tomatoes",
        description: "Vine-ripened, picked this morning",
        category: "vegetables",
        unit_price_cents: 450,
        quantity: 40,
        verified: true,
    },
    DemoProduct {
        seller: "karim-farm",
        name: "Free-range Eggs (dozen)",
        description: "From pasture-raised hens",
        category: "dairy",
        unit_price_cents: 500,
        quantity: 25,
        verified: true,
    },
    DemoProduct {
        seller: "green-valley",
        name: "Basmati Rice 5kg",
        description: "Aged long-grain rice",
        category: "grains",
        unit_price_cents: 1250,
        quantity: 15,
        verified: true,
    },
    DemoProduct {
        seller: "green-valley",
        name: "Raw Honey 500g",
        description: "Unfiltered wildflower honey",
        category: "other",
        unit_price_cents: 900,
        quantity: 10,
        verified: false,
    },
];

/// Seed the database with demo accounts and listings.
///
/// # Errors
///
/// Returns `CommandError` if the connection or any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let password_hash = hash_password(DEMO_PASSWORD)?;

    for account in DEMO_ACCOUNTS {
        sqlx::query(
            "INSERT INTO account (username, password_hash, role, display_name)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (username, role) DO NOTHING",
        )
        .bind(account.username)
        .bind(&password_hash)
        .bind(account.role)
        .bind(account.display_name)
        .execute(&pool)
        .await?;

        tracing::info!("Seeded account {} ({})", account.username, account.role);
    }

    for product in DEMO_PRODUCTS {
        seed_product(&pool, product).await?;
    }

    tracing::info!("Seeding complete. Demo password: {}", DEMO_PASSWORD);
    Ok(())
}

async fn seed_product(pool: &PgPool, product: &DemoProduct) -> Result<(), CommandError> {
    let seller_id: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM account WHERE username = $1 AND role = 'seller'")
            .bind(product.seller)
            .fetch_optional(pool)
            .await?;

    let Some((seller_id,)) = seller_id else {
        return Err(CommandError::Invalid(format!(
            "seed seller {} missing",
            product.seller
        )));
    };

    // Skip listings that already exist for this seller
    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM product WHERE seller_id = $1 AND name = $2")
            .bind(seller_id)
            .bind(product.name)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        tracing::info!("Listing '{}' already seeded, skipping", product.name);
        return Ok(());
    }

    let verification = if product.verified {
        "verified"
    } else {
        "pending"
    };

    sqlx::query(
        "INSERT INTO product
             (seller_id, name, description, category, unit_price, quantity, verification)
         VALUES ($1, $2, $3, $4, $5, $6, $7::verification_status)",
    )
    .bind(seller_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.category)
    .bind(Decimal::new(product.unit_price_cents, 2))
    .bind(product.quantity)
    .bind(verification)
    .execute(pool)
    .await?;

    tracing::info!("Seeded listing '{}' ({})", product.name, verification);
    Ok(())
}
