//! Order Storage
//! Mission: Persist orders and their delivery workflow in SQLite

use crate::orders::models::{Address, Order, OrderDraft, OrderItem, OrderStatus, PaymentMethod};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

pub struct OrderStore {
    db_path: String,
}

impl OrderStore {
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
            "CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                payment_intent_id TEXT UNIQUE,
                payment_method TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                items TEXT NOT NULL,
                total REAL NOT NULL,
                shipping REAL NOT NULL,
                address TEXT,
                status TEXT NOT NULL,
                delivery_agent_id TEXT,
                tracking_number TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Persist a new order in its initial workflow state.
    pub fn create(&self, draft: OrderDraft) -> Result<Order> {
        let now = Utc::now().to_rfc3339();
        let order = Order {
            id: Uuid::new_v4(),
            payment_intent_id: draft.payment_intent_id,
            payment_method: draft.payment_method,
            customer: draft.customer,
            items: draft.items,
            total: draft.total,
            shipping: draft.shipping,
            address: draft.address,
            status: OrderStatus::PendingPickup,
            delivery_agent: draft.delivery_agent,
            tracking_number: None,
            notes: draft.notes,
            created_at: now.clone(),
            updated_at: now,
        };

        let items_json =
            serde_json::to_string(&order.items).context("Failed to encode order items")?;
        let address_json = order
            .address
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode order address")?;

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO orders
                (id, payment_intent_id, payment_method, customer_id, items, total,
                 shipping, address, status, delivery_agent_id, tracking_number,
                 notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                order.id.to_string(),
                order.payment_intent_id,
                order.payment_method.as_str(),
                order.customer.to_string(),
                items_json,
                order.total,
                order.shipping,
                address_json,
                order.status.as_str(),
                order.delivery_agent.map(|a| a.to_string()),
                order.tracking_number,
                order.notes,
                order.created_at,
                order.updated_at,
            ],
        )?;

        info!("Created order {} for customer {}", order.id, order.customer);
        Ok(order)
    }

    pub fn list(&self) -> Result<Vec<Order>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!("{SELECT_ORDER} ORDER BY created_at"))?;
        let orders = stmt
            .query_map([], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!("{SELECT_ORDER} WHERE id = ?1"))?;
        let order = stmt
            .query_row(params![id.to_string()], row_to_order)
            .optional()?;
        Ok(order)
    }

    /// Orders assigned to one delivery agent.
    pub fn list_for_agent(&self, agent: &Uuid) -> Result<Vec<Order>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_ORDER} WHERE delivery_agent_id = ?1 ORDER BY created_at"
        ))?;
        let orders = stmt
            .query_map(params![agent.to_string()], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    /// Move an order through the delivery workflow, scoped to the agent
    /// it is assigned to. Returns None when the order does not exist or
    /// is assigned to a different agent.
    pub fn update_status_for_agent(
        &self,
        id: &Uuid,
        agent: &Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE orders SET status = ?1, updated_at = ?2
             WHERE id = ?3 AND delivery_agent_id = ?4",
            params![
                status.as_str(),
                Utc::now().to_rfc3339(),
                id.to_string(),
                agent.to_string(),
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        info!("Order {} moved to {}", id, status.as_str());
        self.get(id)
    }

    /// Order count and item revenue restricted to the given product ids
    /// (a seller's listings). Sums only what is stored on the items.
    pub fn stats_for_products(&self, product_ids: &[String]) -> Result<(usize, f64)> {
        if product_ids.is_empty() {
            return Ok((0, 0.0));
        }

        let mut order_count = 0usize;
        let mut revenue = 0.0f64;
        for order in self.list()? {
            let seller_items: Vec<&OrderItem> = order
                .items
                .iter()
                .filter(|i| product_ids.contains(&i.product_id))
                .collect();
            if seller_items.is_empty() {
                continue;
            }
            order_count += 1;
            revenue += seller_items
                .iter()
                .map(|i| i.price * i.quantity as f64)
                .sum::<f64>();
        }

        Ok((order_count, revenue))
    }
}

const SELECT_ORDER: &str = "SELECT id, payment_intent_id, payment_method, customer_id, items,
            total, shipping, address, status, delivery_agent_id, tracking_number,
            notes, created_at, updated_at FROM orders";

fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    let id: String = row.get(0)?;
    let payment_method: String = row.get(2)?;
    let customer: String = row.get(3)?;
    let items_json: String = row.get(4)?;
    let address_json: Option<String> = row.get(7)?;
    let status: String = row.get(8)?;
    let agent: Option<String> = row.get(9)?;

    let items: Vec<OrderItem> = serde_json::from_str(&items_json).unwrap_or_default();
    let address: Option<Address> =
        address_json.and_then(|a| serde_json::from_str(&a).ok());

    Ok(Order {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        payment_intent_id: row.get(1)?,
        payment_method: PaymentMethod::from_str(&payment_method)
            .unwrap_or(PaymentMethod::CreditCard),
        customer: Uuid::parse_str(&customer).unwrap_or_default(),
        items,
        total: row.get(5)?,
        shipping: row.get(6)?,
        address,
        status: OrderStatus::from_str(&status).unwrap_or(OrderStatus::PendingPickup),
        delivery_agent: agent.and_then(|a| Uuid::parse_str(&a).ok()),
        tracking_number: row.get(10)?,
        notes: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::models::DEFAULT_SHIPPING;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (OrderStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = OrderStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    fn item(product_id: &str, price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: product_id.to_string(),
            name: "hoodie".to_string(),
            quantity,
            price,
            size: Some("M".to_string()),
            color: None,
            image_url: None,
        }
    }

    fn draft(customer: Uuid, agent: Option<Uuid>, items: Vec<OrderItem>) -> OrderDraft {
        let total = items.iter().map(|i| i.price * i.quantity as f64).sum();
        OrderDraft {
            payment_intent_id: None,
            payment_method: PaymentMethod::CashOnDelivery,
            customer,
            items,
            total,
            shipping: DEFAULT_SHIPPING,
            address: Some(Address {
                city: Some("Springfield".to_string()),
                ..Default::default()
            }),
            delivery_agent: agent,
            notes: None,
        }
    }

    #[test]
    fn test_create_and_round_trip_sub_documents() {
        let (store, _tmp) = create_test_store();
        let customer = Uuid::new_v4();

        let order = store
            .create(draft(customer, None, vec![item("p1", 20.0, 2)]))
            .unwrap();
        assert_eq!(order.status, OrderStatus::PendingPickup);

        let loaded = store.get(&order.id).unwrap().unwrap();
        assert_eq!(loaded.customer, customer);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].size.as_deref(), Some("M"));
        assert_eq!(
            loaded.address.unwrap().city.as_deref(),
            Some("Springfield")
        );
        assert_eq!(loaded.total, 40.0);
    }

    #[test]
    fn test_agent_scoping() {
        let (store, _tmp) = create_test_store();
        let agent_a = Uuid::new_v4();
        let agent_b = Uuid::new_v4();
        let customer = Uuid::new_v4();

        let assigned = store
            .create(draft(customer, Some(agent_a), vec![item("p1", 10.0, 1)]))
            .unwrap();
        store
            .create(draft(customer, Some(agent_b), vec![item("p2", 10.0, 1)]))
            .unwrap();
        store
            .create(draft(customer, None, vec![item("p3", 10.0, 1)]))
            .unwrap();

        let mine = store.list_for_agent(&agent_a).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, assigned.id);

        // A different agent cannot advance someone else's order.
        assert!(store
            .update_status_for_agent(&assigned.id, &agent_b, OrderStatus::Delivered)
            .unwrap()
            .is_none());

        let updated = store
            .update_status_for_agent(&assigned.id, &agent_a, OrderStatus::OutForDelivery)
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::OutForDelivery);
    }

    #[test]
    fn test_stats_for_products() {
        let (store, _tmp) = create_test_store();
        let customer = Uuid::new_v4();

        store
            .create(draft(
                customer,
                None,
                vec![item("mine", 10.0, 2), item("theirs", 99.0, 1)],
            ))
            .unwrap();
        store
            .create(draft(customer, None, vec![item("theirs", 99.0, 1)]))
            .unwrap();

        let (orders, revenue) = store
            .stats_for_products(&["mine".to_string()])
            .unwrap();
        assert_eq!(orders, 1);
        assert_eq!(revenue, 20.0);

        assert_eq!(store.stats_for_products(&[]).unwrap(), (0, 0.0));
    }

    #[test]
    fn test_duplicate_payment_intent_rejected() {
        let (store, _tmp) = create_test_store();
        let customer = Uuid::new_v4();

        let mut d = draft(customer, None, vec![item("p1", 10.0, 1)]);
        d.payment_intent_id = Some("pi_123".to_string());
        store.create(d.clone()).unwrap();

        assert!(store.create(d).is_err());
    }
}
