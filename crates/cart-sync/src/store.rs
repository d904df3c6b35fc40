//! Optimistic cart state store.
//!
//! Every mutation follows the same sequence: acquire the pending-operation
//! key, snapshot the current state, apply the change locally and persist it,
//! then (for a signed-in identity with a server-backed line) call the gateway.
//! A successful call replaces local state wholesale with the server snapshot;
//! a failed one restores only the line it changed, as it was before the
//! change. Other lines keep whatever they hold by then.
//!
//! State lives in a [`watch`] channel. It is only ever mutated synchronously,
//! so no lock is held across a gateway call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cart_kv::Cache;
use cart_model::{
    checked_quantity, CartAggregate, CartLine, CartSnapshot, CatalogError, FeeSummary, ProductId,
    ProductSnapshot, VariantRecord, VariantRef, VariantSelector,
};
use tokio::sync::watch;
use tracing::instrument;

use crate::config::StoreConfig;
use crate::error::{CartAction, CartError, GatewayError};
use crate::events::{AddOrigin, EventNotifier};
use crate::gateway::{CartGateway, GeoPoint};
use crate::guard::{product_key, variant_key, PendingOps};
use crate::persist::LocalCart;

/// Lines plus the fee fields last reported by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub lines: Vec<CartLine>,
    pub fees: FeeSummary,
}

impl CartState {
    /// Whether any line has been confirmed by the server.
    pub fn is_server_backed(&self) -> bool {
        self.lines.iter().any(|l| l.line_id.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// First line for `product_id` (either alias), optionally narrowed to a
    /// variant.
    pub fn find(&self, product_id: &str, variant: Option<&VariantRef>) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(product_id, variant))
    }
}

/// How a mutation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Applied locally only (guest cart, or a line the server does not know).
    Local,
    /// Confirmed by the server and reconciled.
    Synced,
    /// Another mutation for the same key was in flight; nothing happened.
    Skipped,
    /// No matching line.
    NotFound,
    /// The server did not confirm the change; state was reloaded from it.
    Refreshed,
}

/// Pre-mutation entry of the one line a mutation touches.
struct LineUndo {
    product: ProductSnapshot,
    variant: Option<VariantRef>,
    index: usize,
    before: Option<CartLine>,
}

impl LineUndo {
    fn capture(
        lines: &[CartLine],
        product: &ProductSnapshot,
        variant: Option<&VariantRef>,
    ) -> Self {
        let index = lines.iter().position(|l| l.is_same_line(product, variant));
        Self {
            product: product.clone(),
            variant: variant.cloned(),
            index: index.unwrap_or(lines.len()),
            before: index.map(|i| lines[i].clone()),
        }
    }

    fn of(lines: &[CartLine], line: &CartLine) -> Self {
        Self::capture(lines, &line.product, line.variant.as_ref())
    }

    fn apply(self, lines: &mut Vec<CartLine>) {
        let current = lines
            .iter()
            .position(|l| l.is_same_line(&self.product, self.variant.as_ref()));
        match (current, self.before) {
            (Some(i), Some(line)) => lines[i] = line,
            (Some(i), None) => {
                lines.remove(i);
            }
            (None, Some(line)) => lines.insert(self.index.min(lines.len()), line),
            (None, None) => {}
        }
    }
}

/// The cart, kept consistent with a remote cart API.
pub struct CartStore {
    config: StoreConfig,
    local: LocalCart,
    gateway: Arc<dyn CartGateway>,
    state: watch::Sender<CartState>,
    pending: PendingOps,
    notifier: EventNotifier,
    authenticated: AtomicBool,
    location: Mutex<Option<GeoPoint>>,
}

impl CartStore {
    /// Create a guest store and hydrate it from `cache`.
    pub fn new(config: StoreConfig, cache: Cache, gateway: Arc<dyn CartGateway>) -> Self {
        let local = LocalCart::new(cache, config.storage_key.clone());
        let notifier = EventNotifier::new(config.added_event_ttl());
        let (state, _) = watch::channel(CartState::default());
        let store = Self {
            config,
            local,
            gateway,
            state,
            pending: PendingOps::new(),
            notifier,
            authenticated: AtomicBool::new(false),
            location: Mutex::new(None),
        };
        store.hydrate();
        store
    }

    /// Start as a signed-in identity without triggering a refresh.
    pub fn with_authenticated(self, authenticated: bool) -> Self {
        self.authenticated.store(authenticated, Ordering::SeqCst);
        self
    }

    /// Replace the lines with the persisted copy. No network call.
    pub fn hydrate(&self) {
        let lines = self.local.load();
        tracing::debug!(lines = lines.len(), key = %self.local.key(), "hydrated cart");
        self.state.send_modify(|s| s.lines = lines);
    }

    /// Add one of `product` to the cart.
    ///
    /// `variant` of `None` picks the product's first variant, if it has any.
    #[instrument(skip_all, fields(product = %product.name))]
    pub async fn add_item(
        &self,
        product: ProductSnapshot,
        variant: Option<VariantSelector>,
        origin: Option<AddOrigin>,
    ) -> Result<MutationOutcome, CartError> {
        let product = product.normalized()?;
        let Some(product_id) = product.canonical_id().cloned() else {
            return Err(CatalogError::MissingIdentifier(product.name).into());
        };
        let variant = product
            .resolve_variant(variant.as_ref())
            .map(VariantRecord::to_ref);

        // An existing line may know the product under its other alias.
        let key_id = self
            .state
            .borrow()
            .lines
            .iter()
            .find(|l| l.product.same_product(&product))
            .and_then(|l| l.product_id().cloned())
            .unwrap_or_else(|| product_id.clone());
        let Some(_permit) = self.pending.guard(product_key(&key_id)) else {
            tracing::debug!(product_id = %key_id, "add skipped, already in flight");
            return Ok(MutationOutcome::Skipped);
        };

        let mut next = self.state.borrow().clone();
        let undo = LineUndo::capture(&next.lines, &product, variant.as_ref());
        match next
            .lines
            .iter_mut()
            .find(|l| l.is_same_line(&product, variant.as_ref()))
        {
            Some(line) => line.set_quantity(i64::from(line.quantity) + 1)?,
            None => next.lines.push(CartLine::new(product.clone(), variant.clone())),
        }

        self.notifier.emit_added(product, origin);
        self.commit(next);

        if !self.is_authenticated() {
            return Ok(MutationOutcome::Local);
        }
        let result = self
            .gateway
            .add(&product_id, 1, variant.as_ref(), self.location())
            .await;
        self.settle(CartAction::Add, undo, result)
    }

    /// Remove the line for `product_id` (either alias).
    ///
    /// A `variant` of `None` removes the first line of the product whatever
    /// its variant.
    #[instrument(skip(self, variant))]
    pub async fn remove_item(
        &self,
        product_id: &str,
        variant: Option<&VariantRef>,
    ) -> Result<MutationOutcome, CartError> {
        let Some(target) = self.state.borrow().find(product_id, variant).cloned() else {
            return Ok(MutationOutcome::NotFound);
        };
        let canonical = target
            .product_id()
            .cloned()
            .unwrap_or_else(|| ProductId::new(product_id));
        let Some(_permit) = self.pending.guard(product_key(&canonical)) else {
            tracing::debug!(product_id = %canonical, "remove skipped, already in flight");
            return Ok(MutationOutcome::Skipped);
        };

        let mut next = self.state.borrow().clone();
        let undo = LineUndo::of(&next.lines, &target);
        if let Some(index) = next.lines.iter().position(|l| *l == target) {
            next.lines.remove(index);
        }
        self.commit(next);

        let Some(line_id) = target.line_id.as_ref().filter(|_| self.is_authenticated()) else {
            return Ok(MutationOutcome::Local);
        };
        let result = self.gateway.remove(line_id, self.location()).await;
        self.settle(CartAction::Remove, undo, result)
    }

    /// Set the quantity of the line for `product_id`.
    ///
    /// A quantity of zero or less removes the line. Updates that name a
    /// variant are guarded per variant, so two variants of one product can
    /// be updated at the same time.
    #[instrument(skip(self, variant))]
    pub async fn update_quantity(
        &self,
        product_id: &str,
        quantity: i64,
        variant: Option<&VariantRef>,
    ) -> Result<MutationOutcome, CartError> {
        if quantity <= 0 {
            return self.remove_item(product_id, variant).await;
        }
        let quantity = checked_quantity(quantity)?;

        let Some(target) = self.state.borrow().find(product_id, variant).cloned() else {
            return Ok(MutationOutcome::NotFound);
        };
        let canonical = target
            .product_id()
            .cloned()
            .unwrap_or_else(|| ProductId::new(product_id));
        let key = match variant {
            Some(v) => variant_key(&canonical, v),
            None => product_key(&canonical),
        };
        let Some(_permit) = self.pending.guard(key) else {
            tracing::debug!(product_id = %canonical, "update skipped, already in flight");
            return Ok(MutationOutcome::Skipped);
        };

        let mut next = self.state.borrow().clone();
        let undo = LineUndo::of(&next.lines, &target);
        if let Some(line) = next.lines.iter_mut().find(|l| **l == target) {
            line.quantity = quantity;
        }
        self.commit(next);

        let Some(line_id) = target.line_id.as_ref().filter(|_| self.is_authenticated()) else {
            return Ok(MutationOutcome::Local);
        };
        let result = self
            .gateway
            .update_quantity(line_id, quantity, self.location())
            .await;
        self.settle(CartAction::UpdateQuantity, undo, result)
    }

    /// Empty the cart.
    ///
    /// The local clear is never rolled back. If the server does not confirm
    /// it, the cart is reloaded from the server instead.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<MutationOutcome, CartError> {
        self.state.send_modify(|s| s.lines.clear());
        self.persist();

        if !self.is_authenticated() {
            return Ok(MutationOutcome::Local);
        }
        let clear = match self.gateway.clear().await {
            Ok(()) => return Ok(MutationOutcome::Synced),
            Err(e) => e,
        };
        tracing::warn!(error = %clear, "clear not confirmed, refreshing");
        match self.gateway.fetch(self.location()).await {
            Ok(snapshot) => {
                self.reconcile(snapshot);
                Ok(MutationOutcome::Refreshed)
            }
            Err(refresh) => {
                tracing::warn!(error = %refresh, "refresh after failed clear failed");
                Err(CartError::ClearUnconfirmed { clear, refresh })
            }
        }
    }

    /// Replace local state with the server cart.
    ///
    /// `geo` falls back to the location set with
    /// [`set_location`](Self::set_location).
    #[instrument(skip(self))]
    pub async fn refresh(&self, geo: Option<GeoPoint>) -> Result<(), CartError> {
        let snapshot = self
            .gateway
            .fetch(geo.or_else(|| self.location()))
            .await
            .map_err(|e| CartError::remote(CartAction::Refresh, e))?;
        self.reconcile(snapshot);
        Ok(())
    }

    /// Apply an identity transition.
    ///
    /// Signing in loads the server cart. Signing out drops a server-backed
    /// cart locally; a guest cart is kept.
    pub async fn set_authenticated(&self, authenticated: bool) -> Result<(), CartError> {
        let was = self.authenticated.swap(authenticated, Ordering::SeqCst);
        match (was, authenticated) {
            (false, true) => self.refresh(None).await,
            (true, false) => {
                if self.state.borrow().is_server_backed() {
                    tracing::debug!("signed out, dropping server cart");
                    self.state.send_replace(CartState::default());
                    if let Err(e) = self.local.clear() {
                        tracing::warn!(error = %e, "failed to remove persisted cart");
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Location forwarded to every gateway call.
    pub fn set_location(&self, geo: Option<GeoPoint>) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = geo;
    }

    pub fn location(&self) -> Option<GeoPoint> {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Current state.
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.borrow().lines.clone()
    }

    /// Derived totals of the current state.
    pub fn aggregate(&self) -> CartAggregate {
        let state = self.state.borrow();
        CartAggregate::compute(&state.lines, &state.fees, self.config.currency)
    }

    /// Quantity in the cart for a product, summed over its variants unless
    /// one is named.
    pub fn quantity_of(&self, product_id: &str, variant: Option<&VariantRef>) -> u32 {
        self.state
            .borrow()
            .lines
            .iter()
            .filter(|l| l.matches(product_id, variant))
            .map(|l| l.quantity)
            .sum()
    }

    /// Whether an add or remove for the product is in flight.
    pub fn is_pending(&self, product_id: &str) -> bool {
        let canonical = self
            .state
            .borrow()
            .find(product_id, None)
            .and_then(|l| l.product_id().cloned())
            .unwrap_or_else(|| ProductId::new(product_id));
        self.pending.is_pending(&product_key(&canonical))
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Source of "item added" events.
    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn settle(
        &self,
        action: CartAction,
        undo: LineUndo,
        result: Result<CartSnapshot, GatewayError>,
    ) -> Result<MutationOutcome, CartError> {
        match result {
            Ok(snapshot) => {
                self.reconcile(snapshot);
                Ok(MutationOutcome::Synced)
            }
            Err(e) => {
                tracing::warn!(%action, error = %e, "gateway call failed, rolling back line");
                self.state.send_modify(|s| undo.apply(&mut s.lines));
                self.persist();
                Err(CartError::remote(action, e))
            }
        }
    }

    fn reconcile(&self, snapshot: CartSnapshot) {
        let received = snapshot.lines.len();
        let lines: Vec<CartLine> = snapshot
            .lines
            .into_iter()
            .filter_map(CartLine::from_remote)
            .collect();
        if lines.len() < received {
            tracing::warn!(
                dropped = received - lines.len(),
                "server lines without a usable product"
            );
        }
        tracing::debug!(lines = lines.len(), "reconciled with server");
        self.commit(CartState {
            lines,
            fees: snapshot.fees,
        });
    }

    fn commit(&self, state: CartState) {
        self.state.send_replace(state);
        self.persist();
    }

    fn persist(&self) {
        let lines = self.lines();
        if let Err(e) = self.local.save(&lines) {
            tracing::warn!(key = %self.local.key(), error = %e, "failed to persist cart");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .field("pending", &self.pending)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
