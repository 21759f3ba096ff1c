use async_trait::async_trait;
use common::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::{
    CustomerId, Money, NewOrder, NewOrderItem, NewPayment, OrderId, OrderItemRecord, OrderRecord,
    PaymentRecord, Product, ProductId, Result,
    store::{Store, StoreTransaction},
};

const PRODUCT_COLUMNS: &str = "ProductID AS product_id, Name AS name, Price AS price, \
     Category AS category, StockQty AS stock_qty";

/// PostgreSQL-backed store.
///
/// Connections come from a shared [`PgPool`]; each transaction checks one
/// out and returns it when the transaction ends, on every exit path.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool with at most `max_connections` connections.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        tracing::info!(max_connections, "database connection pool established");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Loads a product regardless of its stock level.
    pub async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM Products WHERE ProductID = $1");
        let row = sqlx::query(&sql)
            .bind(product_id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    /// Loads a persisted order.
    pub async fn find_order(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            r#"
            SELECT OrderID AS order_id, CustomerID AS customer_id,
                   TotalAmount AS total_amount, Status AS status
            FROM Orders
            WHERE OrderID = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(OrderRecord {
                id: OrderId::new(row.try_get("order_id")?),
                customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
                total_amount: Money::new(row.try_get::<Decimal, _>("total_amount")?),
                status: row.try_get::<String, _>("status")?.parse()?,
            })),
            None => Ok(None),
        }
    }

    /// Loads the lines of an order in insertion order.
    pub async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItemRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT OrderID AS order_id, ProductID AS product_id,
                   Quantity AS quantity, Price AS price
            FROM OrderItems
            WHERE OrderID = $1
            ORDER BY OrderItemID ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OrderItemRecord {
                    order_id: OrderId::new(row.try_get("order_id")?),
                    product_id: ProductId::new(row.try_get("product_id")?),
                    quantity: row.try_get("quantity")?,
                    unit_price: Money::new(row.try_get::<Decimal, _>("price")?),
                })
            })
            .collect()
    }

    /// Loads the payment recorded for an order.
    pub async fn payment_for(&self, order_id: OrderId) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT OrderID AS order_id, Amount AS amount,
                   PaymentMethod AS payment_method, Status AS status
            FROM Payments
            WHERE OrderID = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(PaymentRecord {
                order_id: OrderId::new(row.try_get("order_id")?),
                amount: Money::new(row.try_get::<Decimal, _>("amount")?),
                method: row.try_get::<String, _>("payment_method")?.parse()?,
                status: row.try_get::<String, _>("status")?.parse()?,
            })),
            None => Ok(None),
        }
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("product_id")?),
            name: row.try_get("name")?,
            price: Money::new(row.try_get::<Decimal, _>("price")?),
            category: row.try_get("category")?,
            stock_qty: row.try_get("stock_qty")?,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn list_available_products(&self) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM Products WHERE StockQty > 0 ORDER BY ProductID ASC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// An open PostgreSQL transaction.
///
/// Dropping it without calling `commit` rolls back and releases the
/// connection back to the pool.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<Option<OrderId>> {
        let order_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO Orders (CustomerID, TotalAmount, Status)
            VALUES ($1, $2, $3)
            RETURNING OrderID
            "#,
        )
        .bind(order.customer_id.as_str())
        .bind(order.total_amount.amount())
        .bind(order.status.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(order_id.map(OrderId::new))
    }

    async fn decrement_stock(&mut self, product_id: ProductId, quantity: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE Products
            SET StockQty = StockQty - $1
            WHERE ProductID = $2 AND StockQty >= $1
            "#,
        )
        .bind(quantity)
        .bind(product_id.as_i32())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_order_item(&mut self, item: &NewOrderItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO OrderItems (OrderID, ProductID, Quantity, Price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.order_id.as_i64())
        .bind(item.product_id.as_i32())
        .bind(item.quantity)
        .bind(item.unit_price.amount())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO Payments (OrderID, Amount, PaymentMethod, Status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(payment.order_id.as_i64())
        .bind(payment.amount.amount())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
