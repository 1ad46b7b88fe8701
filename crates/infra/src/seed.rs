//! Deterministic sample data for dev environments.

use chrono::NaiveDateTime;

use stockroom_products::{NewProduct, Product};

use crate::repository::{ProductRepository, RepositoryError};

const PRODUCT_NAMES: [&str; 15] = [
    "Laptop", "Smartphone", "Headphones", "Monitor", "Keyboard",
    "Mouse", "Printer", "Webcam", "Speaker", "Desk Lamp",
    "Charger", "Tablet", "SSD Drive", "USB Cable", "Router",
];

const DESCRIPTIONS: [&str; 10] = [
    "High quality and reliable.",
    "Latest model with advanced features.",
    "Affordable and durable.",
    "Compact design for easy use.",
    "Ideal for office and home.",
    "Premium build and performance.",
    "Best seller in electronics.",
    "Energy efficient and user friendly.",
    "Ergonomic and stylish.",
    "Comes with a 1-year warranty.",
];

/// The `index`-th sample product. Same index, same product.
///
/// Prices fall in 10.00..=2000.00 and stock in 0..=500.
pub fn sample_product(index: usize) -> NewProduct {
    let name = PRODUCT_NAMES[index % PRODUCT_NAMES.len()];
    let description = DESCRIPTIONS[(index * 7) % DESCRIPTIONS.len()];
    let cents = 1_000 + (index as u64 * 7_919) % 199_001;
    let stock = (index as i64 * 37) % 501;

    NewProduct {
        name: name.to_string(),
        description: Some(description.to_string()),
        price: cents as f64 / 100.0,
        stock,
    }
}

/// Insert `count` sample products.
pub async fn seed_products<R>(
    repo: &R,
    count: usize,
    now: NaiveDateTime,
) -> Result<Vec<Product>, RepositoryError>
where
    R: ProductRepository + ?Sized,
{
    let mut created = Vec::with_capacity(count);
    for index in 0..count {
        created.push(repo.create(sample_product(index), now).await?);
    }
    tracing::info!(count, "seeded sample products");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryProductRepository;
    use chrono::NaiveDate;

    #[test]
    fn samples_are_deterministic_and_valid() {
        for index in 0..1000 {
            let product = sample_product(index);
            assert_eq!(product, sample_product(index));
            assert!(product.validate().is_ok(), "sample {index} invalid: {product:?}");
            assert!((10.0..=2000.0).contains(&product.price));
            assert!((0..=500).contains(&product.stock));
        }
    }

    #[tokio::test]
    async fn seeding_inserts_requested_count() {
        let repo = InMemoryProductRepository::new();
        let now = NaiveDate::from_ymd_opt(2025, 9, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let created = seed_products(&repo, 20, now).await.unwrap();
        assert_eq!(created.len(), 20);
        assert_eq!(repo.list().await.unwrap().len(), 20);
    }
}
