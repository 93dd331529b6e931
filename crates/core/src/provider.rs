//! The seam between the scheduler and whatever answers a request

use crate::client::Client;
use crate::request::SearchRequest;
use std::sync::Arc;

/// Anything that can answer a search request for a client.
///
/// `query` runs synchronously on the caller's thread and reports its
/// outcome to the client as messages; it has no return value. A provider
/// call may block for as long as the client is waiting on a recharge.
pub trait SearchProvider: Send + Sync {
    /// Answer `request` on behalf of `client`
    fn query(&self, client: &Arc<Client>, request: &Arc<SearchRequest>);
}
