//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! driving ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, LoyaltyCommand, LoyaltyQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub loyalty: Arc<dyn LoyaltyCommand>,
    pub loyalty_query: Arc<dyn LoyaltyQuery>,
}

impl HttpState {
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        loyalty: Arc<dyn LoyaltyCommand>,
        loyalty_query: Arc<dyn LoyaltyQuery>,
    ) -> Self {
        Self {
            accounts,
            loyalty,
            loyalty_query,
        }
    }
}
