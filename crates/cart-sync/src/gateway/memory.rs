//! In-memory cart server (for development and testing).
//!
//! Keeps a real server-side line list with generated line ids, so the store
//! reconciles against it exactly as it would against the HTTP API. Calls can
//! be failed on demand or held in flight until released.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cart_model::{
    CartSnapshot, FeeSummary, LineId, ProductId, ProductSnapshot, RemoteLine, VariantRef,
};
use tokio::sync::{watch, Semaphore};

use super::{CartGateway, GeoPoint};
use crate::GatewayError;

/// A call the gateway received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Fetch,
    Add {
        product_id: ProductId,
        quantity: u32,
        variant: Option<VariantRef>,
    },
    UpdateQuantity {
        line_id: LineId,
        quantity: u32,
    },
    Remove {
        line_id: LineId,
    },
    Clear,
}

#[derive(Debug, Default)]
struct ServerCart {
    catalog: Vec<ProductSnapshot>,
    lines: Vec<RemoteLine>,
    fees: FeeSummary,
    next_line: u64,
    calls: Vec<GatewayCall>,
    last_geo: Option<GeoPoint>,
}

impl ServerCart {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            fees: self.fees.clone(),
        }
    }

    fn push_line(
        &mut self,
        product: ProductSnapshot,
        quantity: u32,
        variant: Option<VariantRef>,
    ) -> LineId {
        self.next_line += 1;
        let line_id = LineId::new(format!("line-{}", self.next_line));
        self.lines.push(RemoteLine {
            line_id: line_id.clone(),
            product: Some(product),
            quantity,
            variant,
        });
        line_id
    }
}

fn same_variant(a: Option<&VariantRef>, b: Option<&VariantRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.matches(b),
        _ => false,
    }
}

/// [`CartGateway`] over an in-process server cart.
#[derive(Debug)]
pub struct MemoryGateway {
    cart: Mutex<ServerCart>,
    fail_next: AtomicU32,
    offline: AtomicBool,
    held: AtomicBool,
    gate: Semaphore,
    in_flight: watch::Sender<usize>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Create a server with an empty catalog and cart.
    pub fn new() -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            cart: Mutex::new(ServerCart::default()),
            fail_next: AtomicU32::new(0),
            offline: AtomicBool::new(false),
            held: AtomicBool::new(false),
            gate: Semaphore::new(0),
            in_flight,
        }
    }

    fn cart(&self) -> MutexGuard<'_, ServerCart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make a product addable.
    pub fn with_product(self, product: ProductSnapshot) -> Self {
        self.cart().catalog.push(product);
        self
    }

    /// Fee fields returned with every snapshot.
    pub fn with_fees(self, fees: FeeSummary) -> Self {
        self.cart().fees = fees;
        self
    }

    /// Put a line into the server cart directly (another device added it).
    pub fn seed_line(
        &self,
        product: ProductSnapshot,
        quantity: u32,
        variant: Option<VariantRef>,
    ) -> LineId {
        self.cart().push_line(product, quantity, variant)
    }

    /// Fail the next `n` calls with a connection error.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Fail every call until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Hold every subsequent call in flight until [`release`](Self::release).
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let `n` held calls proceed.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Stop holding calls and let every waiting one proceed.
    pub fn resume(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.gate.add_permits(*self.in_flight.borrow());
    }

    /// Wait until at least `n` calls are in flight.
    pub async fn wait_for_in_flight(&self, n: usize) {
        let mut rx = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.cart().calls.clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.cart().calls.len()
    }

    /// Number of add calls received so far.
    pub fn add_count(&self) -> usize {
        self.cart()
            .calls
            .iter()
            .filter(|c| matches!(c, GatewayCall::Add { .. }))
            .count()
    }

    /// The server's current cart.
    pub fn server_snapshot(&self) -> CartSnapshot {
        self.cart().snapshot()
    }

    /// Geo hint of the most recent call that carried one.
    pub fn last_geo(&self) -> Option<GeoPoint> {
        self.cart().last_geo
    }

    async fn enter(&self, call: GatewayCall, geo: Option<GeoPoint>) -> Result<(), GatewayError> {
        {
            let mut cart = self.cart();
            cart.calls.push(call);
            if geo.is_some() {
                cart.last_geo = geo;
            }
        }

        if self.held.load(Ordering::SeqCst) {
            self.in_flight.send_modify(|c| *c += 1);
            let permit = self.gate.acquire().await;
            self.in_flight.send_modify(|c| *c -= 1);
            match permit {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(GatewayError::Connection("gateway closed".into())),
            }
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Connection("simulated outage".into()));
        }
        let failed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(GatewayError::Connection("simulated failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CartGateway for MemoryGateway {
    async fn fetch(&self, geo: Option<GeoPoint>) -> Result<CartSnapshot, GatewayError> {
        self.enter(GatewayCall::Fetch, geo).await?;
        Ok(self.cart().snapshot())
    }

    async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<&VariantRef>,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError> {
        self.enter(
            GatewayCall::Add {
                product_id: product_id.clone(),
                quantity,
                variant: variant.cloned(),
            },
            geo,
        )
        .await?;

        let mut cart = self.cart();
        let product = cart
            .catalog
            .iter()
            .find(|p| p.matches_id(product_id.as_str()))
            .cloned()
            .ok_or_else(|| GatewayError::Rejected(format!("unknown product {}", product_id)))?;

        let existing = cart.lines.iter_mut().find(|line| {
            line.product
                .as_ref()
                .is_some_and(|p| p.same_product(&product))
                && same_variant(line.variant.as_ref(), variant)
        });
        match existing {
            Some(line) => line.quantity += quantity,
            None => {
                cart.push_line(product, quantity, variant.cloned());
            }
        }
        Ok(cart.snapshot())
    }

    async fn update_quantity(
        &self,
        line_id: &LineId,
        quantity: u32,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError> {
        self.enter(
            GatewayCall::UpdateQuantity {
                line_id: line_id.clone(),
                quantity,
            },
            geo,
        )
        .await?;

        let mut cart = self.cart();
        let line = cart
            .lines
            .iter_mut()
            .find(|l| &l.line_id == line_id)
            .ok_or_else(|| GatewayError::Rejected(format!("unknown line {}", line_id)))?;
        line.quantity = quantity;
        cart.lines.retain(|l| l.quantity > 0);
        Ok(cart.snapshot())
    }

    async fn remove(
        &self,
        line_id: &LineId,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError> {
        self.enter(
            GatewayCall::Remove {
                line_id: line_id.clone(),
            },
            geo,
        )
        .await?;

        let mut cart = self.cart();
        cart.lines.retain(|l| &l.line_id != line_id);
        Ok(cart.snapshot())
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        self.enter(GatewayCall::Clear, None).await?;
        self.cart().lines.clear();
        Ok(())
    }
}
