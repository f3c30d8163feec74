//! Postgres catalog

use async_trait::async_trait;
use platter::{
    ids::{ProductId, RestaurantId},
    items::AddOn,
    prices::Price,
    products::{Category, Product, Restaurant},
};
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    catalog::{Catalog, CatalogError},
    database::Db,
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LIST_ADD_ONS_SQL: &str = include_str!("sql/list_add_ons.sql");
const GET_RESTAURANT_SQL: &str = include_str!("sql/get_restaurant.sql");

#[derive(Debug, Clone)]
pub struct PgCatalog {
    db: Db,
}

impl PgCatalog {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let mut tx = self.db.begin().await?;

        let ProductRow(mut product) = query_as::<Postgres, ProductRow>(GET_PRODUCT_SQL)
            .bind(id.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        product.add_ons = query_as::<Postgres, AddOnRow>(LIST_ADD_ONS_SQL)
            .bind(id.into_uuid())
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|AddOnRow(add_on)| add_on)
            .collect();

        tx.commit().await?;

        Ok(product)
    }

    async fn get_restaurant(&self, id: RestaurantId) -> Result<Restaurant, CatalogError> {
        let mut tx = self.db.begin().await?;

        let RestaurantRow(restaurant) = query_as::<Postgres, RestaurantRow>(GET_RESTAURANT_SQL)
            .bind(id.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(restaurant)
    }
}

struct ProductRow(Product);

struct AddOnRow(AddOn);

struct RestaurantRow(Restaurant);

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let category: String = row.try_get("category")?;

        let category = Category::parse(&category).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "category".to_string(),
            source: format!("unknown category {category:?}").into(),
        })?;

        Ok(Self(Product {
            id: ProductId::from_uuid(row.try_get("uuid")?),
            restaurant: RestaurantId::from_uuid(row.try_get("restaurant_uuid")?),
            name: row.try_get("name")?,
            category,
            price: try_get_price(row, "price")?,
            add_ons: Vec::new(),
            available: row.try_get("available")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for AddOnRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(AddOn::new(
            row.try_get::<String, _>("name")?,
            try_get_price(row, "price")?,
        )))
    }
}

impl<'r> FromRow<'r, PgRow> for RestaurantRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let delivery_fee = row
            .try_get::<Option<i64>, _>("delivery_fee")?
            .map(|fee| to_price(fee, "delivery_fee"))
            .transpose()?;

        Ok(Self(Restaurant {
            id: RestaurantId::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            delivery_fee,
            is_open: row.try_get("is_open")?,
        }))
    }
}

fn try_get_price(row: &PgRow, col: &str) -> Result<Price, sqlx::Error> {
    to_price(row.try_get(col)?, col)
}

fn to_price(amount: i64, col: &str) -> Result<Price, sqlx::Error> {
    u64::try_from(amount)
        .map(Price::new)
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: col.to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use sqlx::query;
    use testresult::TestResult;

    use super::*;
    use crate::test::db::TestDb;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn loads_products_with_ordered_add_ons() -> TestResult {
        let db = TestDb::new().await;
        let restaurant = RestaurantId::new();
        let product = ProductId::new();

        query("INSERT INTO restaurants (uuid, name, delivery_fee) VALUES ($1, 'Dosa Corner', 300)")
            .bind(restaurant.into_uuid())
            .execute(&db.pool)
            .await?;

        query(
            "INSERT INTO products (uuid, restaurant_uuid, name, category, price) \
             VALUES ($1, $2, 'Masala Dosa', 'mains', 900)",
        )
        .bind(product.into_uuid())
        .bind(restaurant.into_uuid())
        .execute(&db.pool)
        .await?;

        query(
            "INSERT INTO product_add_ons (product_uuid, position, name, price) \
             VALUES ($1, 1, 'Ghee', 100), ($1, 0, 'Sambar', 50)",
        )
        .bind(product.into_uuid())
        .execute(&db.pool)
        .await?;

        let catalog = PgCatalog::new(Db::new(db.pool.clone()));
        let found = catalog.get_product(product).await?;

        assert_eq!(found.price, Price::new(900));
        assert_eq!(found.category, Category::Mains);
        assert_eq!(
            found.add_ons,
            vec![AddOn::new("Sambar", Price::new(50)), AddOn::new("Ghee", Price::new(100))]
        );

        let restaurant = catalog.get_restaurant(restaurant).await?;

        assert_eq!(restaurant.delivery_fee, Some(Price::new(300)));
        assert!(restaurant.is_open);

        assert!(matches!(
            catalog.get_product(ProductId::new()).await,
            Err(CatalogError::NotFound)
        ));

        Ok(())
    }
}
