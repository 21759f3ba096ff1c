//! Order transaction coordinator.
//!
//! Places an order as one storage transaction: the order row, a guarded
//! stock decrement and an order line per cart line, and the payment row.
//! Either every row is committed or none is.

use std::time::Instant;

use common::{Money, OrderId};
use store::{
    NewOrder, NewOrderItem, NewPayment, OrderStatus, PaymentMethod, PaymentStatus, Store,
    StoreTransaction,
};

use crate::cart::{CartLine, ValidatedOrder};
use crate::error::{Result, ShopError};
use crate::phase::OrderPhase;

/// Outcome of a committed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total_amount: Money,
}

/// Coordinates order placement against a transactional store.
///
/// The coordinator does no locking of its own. Concurrent orders are kept
/// from overselling by the conditional stock decrement and the store's
/// transaction isolation.
pub struct OrderCoordinator<S: Store> {
    store: S,
}

impl<S: Store> OrderCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order for `customer_id` with the given cart lines.
    ///
    /// Lines are applied in the order given. On any failure after the
    /// transaction is opened, the transaction is rolled back before the
    /// error is returned. Placing the same cart twice creates two orders.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn place_order(
        &self,
        customer_id: &str,
        lines: Vec<CartLine>,
    ) -> Result<OrderReceipt> {
        let mut phase = OrderPhase::Started;

        advance(&mut phase, OrderPhase::Validating);
        let order = ValidatedOrder::validate(customer_id, lines).inspect_err(record_failure)?;

        let started = Instant::now();
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(ShopError::from)
            .inspect_err(record_failure)?;
        advance(&mut phase, OrderPhase::InTransaction);

        let written = write_order(tx.as_mut(), &order).await;
        let outcome = match written {
            Ok(order_id) => tx
                .commit()
                .await
                .map(|()| order_id)
                .map_err(ShopError::from),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        };

        metrics::histogram!("order_transaction_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(order_id) => {
                advance(&mut phase, OrderPhase::Committed);
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(
                    %order_id,
                    total = %order.total(),
                    customer_id = %order.customer_id(),
                    "order placed"
                );
                Ok(OrderReceipt {
                    order_id,
                    total_amount: order.total(),
                })
            }
            Err(err) => {
                advance(&mut phase, OrderPhase::RolledBack);
                tracing::warn!(error = %err, "order transaction rolled back");
                record_failure(&err);
                Err(err)
            }
        }
    }
}

/// Performs every write of the order inside the open transaction.
async fn write_order<T>(tx: &mut T, order: &ValidatedOrder) -> Result<OrderId>
where
    T: StoreTransaction + ?Sized,
{
    let total = order.total();

    let order_id = tx
        .insert_order(&NewOrder {
            customer_id: order.customer_id().clone(),
            total_amount: total,
            status: OrderStatus::Completed,
        })
        .await?
        .ok_or_else(|| ShopError::TransactionError("order id not generated".to_string()))?;

    for line in order.lines() {
        if !tx.decrement_stock(line.product_id, line.quantity).await? {
            return Err(ShopError::InsufficientStock(line.product_id));
        }

        tx.insert_order_item(&NewOrderItem {
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .await?;
    }

    tx.insert_payment(&NewPayment {
        order_id,
        amount: total,
        method: PaymentMethod::Card,
        status: PaymentStatus::Success,
    })
    .await?;

    Ok(order_id)
}

fn advance(phase: &mut OrderPhase, next: OrderPhase) {
    debug_assert!(
        phase.can_transition_to(next),
        "illegal order phase transition {phase} -> {next}"
    );
    tracing::debug!(from = %phase, to = %next, "order phase");
    *phase = next;
}

fn record_failure(err: &ShopError) {
    metrics::counter!("orders_failed_total", "reason" => err.kind()).increment(1);
}
