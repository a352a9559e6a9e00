use std::cell::RefCell;
use std::future::Future;

use hc_gateway::GatewayResult;
use tracing::{debug, warn};

use crate::view::Redraw;

/// Identifies one issued fetch. Only the most recently issued ticket may
/// settle a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Fetch cell shared by all screens: last good payload, loading flag, and the
/// error message of the last failed fetch.
#[derive(Debug)]
pub struct Resource<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    issued: u64,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            issued: 0,
        }
    }
}

impl<T> Resource<T> {
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        self.error = None;
        Ticket(self.issued)
    }

    /// Returns `false` when the ticket is stale and the result was dropped.
    pub fn settle(&mut self, ticket: Ticket, result: GatewayResult<T>) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.loading = false;
        match result {
            Ok(data) => self.data = Some(data),
            Err(err) => self.error = Some(err.message),
        }
        true
    }

    /// Back to the empty state; anything still in flight becomes stale.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.data = None;
        self.loading = false;
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Runs one fetch against `cell`: mark loading, await, settle.
///
/// The redraw hook fires when loading starts and when a result lands. The
/// request future is lazy, so nothing goes out before `begin`.
pub(crate) async fn load_into<T, F>(
    label: &str,
    cell: &RefCell<Resource<T>>,
    redraw: &Redraw,
    request: F,
) -> bool
where
    F: Future<Output = GatewayResult<T>>,
{
    let ticket = cell.borrow_mut().begin();
    debug!("{label}: fetch started");
    redraw.fire();

    let result = request.await;
    if let Err(err) = &result {
        warn!("{label}: fetch failed: {err}");
    }

    let applied = cell.borrow_mut().settle(ticket, result);
    if applied {
        redraw.fire();
    } else {
        debug!("{label}: stale response dropped");
    }
    applied
}
