use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BrokerError;

use super::types::{Order, OrderRequest, OrderSide, OrderStatus, Portfolio};

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

/// In-memory paper-trading broker.
///
/// Orders are filled synchronously at placement, so every order in the
/// registry is FILLED unless a future order type leaves one resting.
pub struct BrokerLedger {
    state: Mutex<LedgerState>,
}

struct LedgerState {
    cash: f64,
    positions: HashMap<String, i64>,
    // Insertion order is the listing order.
    orders: Vec<Order>,
    index: HashMap<String, usize>,
}

fn new_order(request: OrderRequest) -> Order {
    Order {
        order_id: Uuid::new_v4().to_string(),
        symbol: request.symbol,
        side: request.side,
        quantity: request.quantity,
        price: request.price,
        status: OrderStatus::Open,
    }
}

impl LedgerState {
    fn register(&mut self, order: Order) -> usize {
        let idx = self.orders.len();
        self.index.insert(order.order_id.clone(), idx);
        self.orders.push(order);
        idx
    }

    /// Position and cash after filling `order`, or the reason it cannot be booked.
    fn settlement(&self, order: &Order) -> Result<(i64, f64), BrokerError> {
        let position = self.positions.get(&order.symbol).copied().unwrap_or(0);
        let cost = order.cost();

        let (new_position, new_cash) = match order.side {
            OrderSide::Buy => (position.checked_add(order.quantity), self.cash - cost),
            OrderSide::Sell => (position.checked_sub(order.quantity), self.cash + cost),
        };

        let new_position = new_position.ok_or_else(|| BrokerError::PositionOverflow {
            symbol: order.symbol.clone(),
            position,
            side: order.side,
            quantity: order.quantity,
        })?;
        if !new_cash.is_finite() {
            return Err(BrokerError::CashOverflow {
                cash: self.cash,
                cost,
            });
        }
        Ok((new_position, new_cash))
    }

    fn fill(&mut self, idx: usize, position: i64, cash: f64) {
        let order = &mut self.orders[idx];
        self.positions.insert(order.symbol.clone(), position);
        self.cash = cash;
        order.status = OrderStatus::Filled;

        info!(
            "💰 [BROKER] Filled {:?} {} x{} @ {:?} (cash now {:.2})",
            order.side, order.symbol, order.quantity, order.price, self.cash
        );
    }
}

impl BrokerLedger {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                cash: initial_cash,
                positions: HashMap::new(),
                orders: Vec::new(),
                index: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // Every critical section leaves the state consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new order and fill it immediately. The request is expected
    /// to have passed [`OrderRequest::validate`]. An order whose fill would
    /// overflow the position or cash is refused and leaves the ledger untouched.
    pub fn place_order(&self, request: OrderRequest) -> Result<Order, BrokerError> {
        let mut state = self.lock();
        let order = new_order(request);

        let (position, cash) = match state.settlement(&order) {
            Ok(settled) => settled,
            Err(e) => {
                warn!("⚠️ [BROKER] Rejected order for {}: {}", order.symbol, e);
                return Err(e);
            }
        };

        let idx = state.register(order);
        state.fill(idx, position, cash);
        Ok(state.orders[idx].clone())
    }

    /// Register an order without filling it, leaving it OPEN.
    #[cfg(test)]
    pub(crate) fn register_open(&self, request: OrderRequest) -> Order {
        let mut state = self.lock();
        let idx = state.register(new_order(request));
        state.orders[idx].clone()
    }

    pub fn list_orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    pub fn get_portfolio(&self) -> Portfolio {
        let state = self.lock();
        Portfolio {
            cash: state.cash,
            positions: state.positions.clone(),
        }
    }

    /// Cancel an OPEN order. Filled and cancelled orders are terminal.
    pub fn cancel_order(&self, order_id: &str) -> Result<Order, BrokerError> {
        let mut state = self.lock();
        let idx = *state
            .index
            .get(order_id)
            .ok_or_else(|| BrokerError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        let order = &mut state.orders[idx];
        if order.status != OrderStatus::Open {
            warn!(
                "⚠️ [BROKER] Refusing to cancel {} (status={})",
                order_id, order.status
            );
            return Err(BrokerError::NotCancellable {
                order_id: order_id.to_string(),
                status: order.status,
            });
        }

        order.status = OrderStatus::Cancelled;
        info!("🛑 [BROKER] Cancelled order {}", order_id);
        Ok(order.clone())
    }
}

impl Default for BrokerLedger {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CASH)
    }
}
