use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    NewOrder, NewOrderItem, NewPayment, OrderId, OrderItemRecord, OrderRecord, PaymentRecord,
    Product, ProductId, Result, StoreError,
    store::{Store, StoreTransaction},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, OrderRecord>,
    order_items: Vec<OrderItemRecord>,
    payments: Vec<PaymentRecord>,
    last_order_id: i64,
}

#[derive(Debug, Default)]
struct FailureSwitches {
    unavailable: AtomicBool,
    withhold_order_id: AtomicBool,
}

/// In-memory store for tests and local runs.
///
/// A transaction holds the table lock from `begin` until it ends, so
/// transactions are fully serialized. Writes go to a working copy that
/// replaces the tables only on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    switches: Arc<FailureSwitches>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let tables = Tables {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            ..Tables::default()
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
            switches: Arc::default(),
        }
    }

    /// Makes every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.switches.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes order inserts succeed without reporting a generated ID.
    pub fn set_withhold_order_id(&self, withhold: bool) {
        self.switches
            .withhold_order_id
            .store(withhold, Ordering::SeqCst);
    }

    /// Loads a product regardless of its stock level.
    pub async fn find_product(&self, product_id: ProductId) -> Option<Product> {
        self.tables.lock().await.products.get(&product_id).cloned()
    }

    /// Loads a persisted order.
    pub async fn find_order(&self, order_id: OrderId) -> Option<OrderRecord> {
        self.tables.lock().await.orders.get(&order_id).cloned()
    }

    /// Loads the lines of an order in insertion order.
    pub async fn order_items(&self, order_id: OrderId) -> Vec<OrderItemRecord> {
        self.tables
            .lock()
            .await
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Loads the payment recorded for an order.
    pub async fn payment_for(&self, order_id: OrderId) -> Option<PaymentRecord> {
        self.tables
            .lock()
            .await
            .payments
            .iter()
            .find(|payment| payment.order_id == order_id)
            .cloned()
    }

    /// Returns the number of orders, order items and payments stored.
    pub async fn row_counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.lock().await;
        (
            tables.orders.len(),
            tables.order_items.len(),
            tables.payments.len(),
        )
    }

    fn check_available(&self) -> Result<()> {
        if self.switches.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_available_products(&self) -> Result<Vec<Product>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.is_available())
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        self.check_available()?;
        let guard = self.tables.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            switches: self.switches.clone(),
        }))
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}

/// An open in-memory transaction.
///
/// Holds the table lock for its whole lifetime. Dropping it without
/// committing leaves the tables as they were.
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    switches: Arc<FailureSwitches>,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<Option<OrderId>> {
        self.working.last_order_id += 1;
        let id = OrderId::new(self.working.last_order_id);
        self.working.orders.insert(
            id,
            OrderRecord {
                id,
                customer_id: order.customer_id.clone(),
                total_amount: order.total_amount,
                status: order.status,
            },
        );

        if self.switches.withhold_order_id.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(id))
    }

    async fn decrement_stock(&mut self, product_id: ProductId, quantity: i32) -> Result<bool> {
        match self.working.products.get_mut(&product_id) {
            Some(product) if product.stock_qty >= quantity => {
                product.stock_qty -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_order_item(&mut self, item: &NewOrderItem) -> Result<()> {
        self.working.order_items.push(OrderItemRecord {
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        });
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<()> {
        self.working.payments.push(PaymentRecord {
            order_id: payment.order_id,
            amount: payment.amount,
            method: payment.method,
            status: payment.status,
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CustomerId, Money, OrderStatus};

    fn product(id: i32, stock: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_cents(1000),
            category: "Test".to_string(),
            stock_qty: stock,
        }
    }

    fn new_order() -> NewOrder {
        NewOrder {
            customer_id: CustomerId::new("c-1"),
            total_amount: Money::from_cents(1000),
            status: OrderStatus::Completed,
        }
    }

    #[tokio::test]
    async fn lists_only_products_in_stock() {
        let store = InMemoryStore::with_products([product(1, 5), product(2, 0), product(3, 1)]);
        let products = store.list_available_products().await.unwrap();
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn decrement_is_guarded() {
        let store = InMemoryStore::with_products([product(1, 2)]);
        let mut tx = store.begin().await.unwrap();
        assert!(!tx.decrement_stock(ProductId::new(1), 3).await.unwrap());
        assert!(tx.decrement_stock(ProductId::new(1), 2).await.unwrap());
        assert!(!tx.decrement_stock(ProductId::new(1), 1).await.unwrap());
        assert!(!tx.decrement_stock(ProductId::new(99), 1).await.unwrap());
        tx.commit().await.unwrap();

        let p = store.find_product(ProductId::new(1)).await.unwrap();
        assert_eq!(p.stock_qty, 0);
    }

    #[tokio::test]
    async fn commit_publishes_writes() {
        let store = InMemoryStore::with_products([product(1, 5)]);
        let mut tx = store.begin().await.unwrap();
        let order_id = tx.insert_order(&new_order()).await.unwrap().unwrap();
        tx.decrement_stock(ProductId::new(1), 1).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.find_order(order_id).await.is_some());
        assert_eq!(store.find_product(ProductId::new(1)).await.unwrap().stock_qty, 4);
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let store = InMemoryStore::with_products([product(1, 5)]);
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&new_order()).await.unwrap();
        tx.decrement_stock(ProductId::new(1), 5).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.row_counts().await, (0, 0, 0));
        assert_eq!(store.find_product(ProductId::new(1)).await.unwrap().stock_qty, 5);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryStore::with_products([product(1, 5)]);
        {
            let mut tx = store.begin().await.unwrap();
            tx.decrement_stock(ProductId::new(1), 5).await.unwrap();
        }
        assert_eq!(store.find_product(ProductId::new(1)).await.unwrap().stock_qty, 5);
    }

    #[tokio::test]
    async fn order_ids_are_sequential() {
        let store = InMemoryStore::new();
        for expected in 1..=2 {
            let mut tx = store.begin().await.unwrap();
            let id = tx.insert_order(&new_order()).await.unwrap().unwrap();
            tx.commit().await.unwrap();
            assert_eq!(id, OrderId::new(expected));
        }
    }

    #[tokio::test]
    async fn unavailable_switch_fails_operations() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_available_products().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.begin().await.is_err());
        assert!(store.ping().await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn withheld_order_id() {
        let store = InMemoryStore::new();
        store.set_withhold_order_id(true);
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.insert_order(&new_order()).await.unwrap(), None);
    }
}
