//! Error types for the sync engine.

use std::fmt;

use cart_model::CatalogError;
use thiserror::Error;

/// Failure reported by a remote cart gateway.
///
/// The store only distinguishes success from failure; the variants exist
/// for logging and for the user-visible message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("HTTP error: {status} for {path}")]
    Http { status: u16, path: String },

    #[error("Not authorized for a server cart")]
    Unauthorized,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}

impl From<http::Error> for GatewayError {
    fn from(e: http::Error) -> Self {
        GatewayError::Request(e.to_string())
    }
}

/// Cart operation a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartAction {
    Add,
    UpdateQuantity,
    Remove,
    Clear,
    Refresh,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::Add => "add item to cart",
            CartAction::UpdateQuantity => "update quantity",
            CartAction::Remove => "remove item from cart",
            CartAction::Clear => "clear cart",
            CartAction::Refresh => "refresh cart",
        }
    }
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`CartStore`](crate::CartStore) operations.
///
/// None of these are fatal: local state has either been rolled back to the
/// last known-good snapshot or replaced by server truth, and the user may
/// retry.
#[derive(Debug, Error)]
pub enum CartError {
    /// Gateway call failed; local state was rolled back.
    #[error("Failed to {action}: {source}")]
    Remote {
        action: CartAction,
        #[source]
        source: GatewayError,
    },

    /// Clear was applied locally, the server did not confirm it, and the
    /// follow-up refresh failed too.
    #[error("Cart cleared locally but not confirmed by the server ({clear}); refresh failed: {refresh}")]
    ClearUnconfirmed {
        clear: GatewayError,
        #[source]
        refresh: GatewayError,
    },

    /// Product or quantity rejected before any state change.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl CartError {
    pub(crate) fn remote(action: CartAction, source: GatewayError) -> Self {
        CartError::Remote { action, source }
    }

    /// Action the error is attributed to, if any.
    pub fn action(&self) -> Option<CartAction> {
        match self {
            CartError::Remote { action, .. } => Some(*action),
            CartError::ClearUnconfirmed { .. } => Some(CartAction::Clear),
            CartError::Catalog(_) => None,
        }
    }

    /// Short message suitable for a toast or banner.
    pub fn user_message(&self) -> String {
        match self {
            CartError::Remote { action, .. } => {
                format!("Couldn't {action}. Please try again.")
            }
            CartError::ClearUnconfirmed { .. } => {
                "Your cart was cleared here but we couldn't confirm it with the server. Pull to refresh."
                    .to_string()
            }
            CartError::Catalog(e) => format!("This item can't be added: {e}"),
        }
    }
}
