//! Product Storage
//! Mission: Persist seller listings with SQLite

use crate::catalog::models::{Category, Product, ProductDraft, ProductStatus};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

pub struct ProductStore {
    db_path: String,
}

impl ProductStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0,
                category TEXT NOT NULL,
                image_url TEXT,
                description TEXT NOT NULL,
                seller_id TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Create a listing for a seller. New listings are always pending.
    pub fn create(&self, seller: Uuid, draft: ProductDraft) -> Result<Product> {
        let now = Utc::now().to_rfc3339();
        let product = Product {
            id: Uuid::new_v4(),
            name: draft.name,
            price: draft.price,
            stock: draft.stock,
            category: draft.category,
            image_url: draft.image_url,
            description: draft.description,
            seller,
            status: ProductStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO products
                (id, name, price, stock, category, image_url, description,
                 seller_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                product.id.to_string(),
                product.name,
                product.price,
                product.stock,
                product.category.as_str(),
                product.image_url,
                product.description,
                product.seller.to_string(),
                product.status.as_str(),
                product.created_at,
                product.updated_at,
            ],
        )?;

        info!("Created product {} for seller {}", product.id, seller);
        Ok(product)
    }

    /// All listings owned by one seller.
    pub fn list_for_seller(&self, seller: &Uuid) -> Result<Vec<Product>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_PRODUCT} WHERE seller_id = ?1 ORDER BY created_at"
        ))?;
        let products = stmt
            .query_map(params![seller.to_string()], row_to_product)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// One listing, scoped to its owning seller.
    pub fn get_for_seller(&self, id: &Uuid, seller: &Uuid) -> Result<Option<Product>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt =
            conn.prepare(&format!("{SELECT_PRODUCT} WHERE id = ?1 AND seller_id = ?2"))?;
        let product = stmt
            .query_row(params![id.to_string(), seller.to_string()], row_to_product)
            .optional()?;
        Ok(product)
    }

    /// Replace a listing's seller-editable fields, scoped to its owner.
    /// A `None` image keeps the stored one. Returns None if the product
    /// does not exist or belongs to someone else.
    pub fn update_for_seller(
        &self,
        id: &Uuid,
        seller: &Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE products SET
                name = ?1, price = ?2, stock = ?3, category = ?4,
                image_url = COALESCE(?5, image_url),
                description = ?6, updated_at = ?7
             WHERE id = ?8 AND seller_id = ?9",
            params![
                draft.name,
                draft.price,
                draft.stock,
                draft.category.as_str(),
                draft.image_url,
                draft.description,
                Utc::now().to_rfc3339(),
                id.to_string(),
                seller.to_string(),
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        self.get_for_seller(id, seller)
    }

    /// Delete a listing, scoped to its owner. Returns false if nothing
    /// matched.
    pub fn delete_for_seller(&self, id: &Uuid, seller: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM products WHERE id = ?1 AND seller_id = ?2",
            params![id.to_string(), seller.to_string()],
        )?;
        Ok(rows > 0)
    }

    /// All listings, optionally filtered by moderation status (admin view).
    pub fn list(&self, status: Option<ProductStatus>) -> Result<Vec<Product>> {
        let conn = Connection::open(&self.db_path)?;
        let products = match status {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_PRODUCT} WHERE status = ?1 ORDER BY created_at"
                ))?;
                let rows = stmt
                    .query_map(params![status.as_str()], row_to_product)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!("{SELECT_PRODUCT} ORDER BY created_at"))?;
                let rows = stmt
                    .query_map([], row_to_product)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(products)
    }

    /// Admin moderation: move a listing to approved/rejected.
    pub fn set_status(&self, id: &Uuid, status: ProductStatus) -> Result<Option<Product>> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE products SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.as_str(),
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        info!("Product {} marked {}", id, status.as_str());
        let mut stmt = conn.prepare(&format!("{SELECT_PRODUCT} WHERE id = ?1"))?;
        let product = stmt
            .query_row(params![id.to_string()], row_to_product)
            .optional()?;
        Ok(product)
    }

    /// Listing ids for one seller, used by the dashboard aggregates.
    pub fn ids_for_seller(&self, seller: &Uuid) -> Result<Vec<String>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT id FROM products WHERE seller_id = ?1")?;
        let ids = stmt
            .query_map(params![seller.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

const SELECT_PRODUCT: &str = "SELECT id, name, price, stock, category, image_url, description,
            seller_id, status, created_at, updated_at FROM products";

fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    let id: String = row.get(0)?;
    let category: String = row.get(4)?;
    let seller: String = row.get(7)?;
    let status: String = row.get(8)?;
    Ok(Product {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        name: row.get(1)?,
        price: row.get(2)?,
        stock: row.get(3)?,
        category: Category::from_str(&category).unwrap_or(Category::TShirt),
        image_url: row.get(5)?,
        description: row.get(6)?,
        seller: Uuid::parse_str(&seller).unwrap_or_default(),
        status: ProductStatus::from_str(&status).unwrap_or(ProductStatus::Pending),
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (ProductStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = ProductStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price: 19.99,
            stock: 5,
            category: Category::Hoodies,
            image_url: Some("/uploads/images/h.png".to_string()),
            description: "warm".to_string(),
        }
    }

    #[test]
    fn test_create_starts_pending_and_is_seller_scoped() {
        let (store, _tmp) = create_test_store();
        let seller_a = Uuid::new_v4();
        let seller_b = Uuid::new_v4();

        let p = store.create(seller_a, draft("hoodie")).unwrap();
        assert_eq!(p.status, ProductStatus::Pending);

        assert_eq!(store.list_for_seller(&seller_a).unwrap().len(), 1);
        assert!(store.list_for_seller(&seller_b).unwrap().is_empty());
        assert!(store.get_for_seller(&p.id, &seller_b).unwrap().is_none());
    }

    #[test]
    fn test_update_preserves_image_when_absent() {
        let (store, _tmp) = create_test_store();
        let seller = Uuid::new_v4();
        let p = store.create(seller, draft("hoodie")).unwrap();

        let mut changed = draft("renamed");
        changed.image_url = None;
        changed.price = 24.99;

        let updated = store
            .update_for_seller(&p.id, &seller, changed)
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.price, 24.99);
        assert_eq!(updated.image_url.as_deref(), Some("/uploads/images/h.png"));
    }

    #[test]
    fn test_update_and_delete_refuse_foreign_seller() {
        let (store, _tmp) = create_test_store();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let p = store.create(owner, draft("hoodie")).unwrap();

        assert!(store
            .update_for_seller(&p.id, &intruder, draft("stolen"))
            .unwrap()
            .is_none());
        assert!(!store.delete_for_seller(&p.id, &intruder).unwrap());
        assert!(store.delete_for_seller(&p.id, &owner).unwrap());
    }

    #[test]
    fn test_moderation_status_filter() {
        let (store, _tmp) = create_test_store();
        let seller = Uuid::new_v4();

        let a = store.create(seller, draft("a")).unwrap();
        let _b = store.create(seller, draft("b")).unwrap();

        store.set_status(&a.id, ProductStatus::Approved).unwrap();

        let approved = store.list(Some(ProductStatus::Approved)).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);

        let pending = store.list(Some(ProductStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);

        assert_eq!(store.list(None).unwrap().len(), 2);
        assert!(store
            .set_status(&Uuid::new_v4(), ProductStatus::Approved)
            .unwrap()
            .is_none());
    }
}
