//! persistence of finalized orders

pub(crate) mod order_file;

use std::path::PathBuf;
use crate::server::model::order::OrderError;
use crate::server::model::receipt::CustomerId;

/// Write capability for finalized orders, keyed by customer.
pub(crate) trait OrderStore: Send + Sync + 'static {
    /// Persist `content` for `customer`, replacing any previous order of the same customer.
    fn save(&self, customer: &CustomerId, content: &str) -> Result<PathBuf, OrderError>;
}
