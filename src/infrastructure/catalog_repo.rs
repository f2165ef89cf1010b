use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::Catalog;
use crate::domain::product::{Product, ProductId, ProductUpsert};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselCatalog {
    pool: DbPool,
}

impl DieselCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Catalog for DieselCatalog {
    fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn product_by_key(&self, key: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::key.eq(key))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order((products::name.asc(), products::id.asc()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn upsert_products(
        &self,
        entries: &[ProductUpsert],
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        // One statement per entry: a single multi-row ON CONFLICT statement
        // rejects batches that name the same key twice.
        conn.transaction::<_, DomainError, _>(|conn| {
            for entry in entries {
                diesel::insert_into(products::table)
                    .values(&NewProductRow {
                        key: &entry.key,
                        name: &entry.name,
                        description: &entry.description,
                        price: &entry.price,
                        active: entry.active,
                        created_at: now,
                        updated_at: now,
                    })
                    .on_conflict(products::key)
                    .do_update()
                    .set((
                        products::name.eq(excluded(products::name)),
                        products::description.eq(excluded(products::description)),
                        products::price.eq(excluded(products::price)),
                        products::active.eq(excluded(products::active)),
                        products::updated_at.eq(excluded(products::updated_at)),
                    ))
                    .execute(conn)?;
            }
            Ok(entries.len())
        })
    }
}
