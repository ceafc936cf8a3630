//! Dispatcher Module
//!
//! Maps decoded requests onto the store and builds the status responses.
//!
//! ## Responsibilities
//! - Decode raw request bytes and report parse failures as `400`
//! - Route GET/PUT/DEL to the store
//! - Serialize every store access behind one lock
//! - Own the store's teardown

use parking_lot::Mutex;

use crate::error::{ParseError, Result, StoreError};
use crate::protocol::{decode_request, Request, Response};
use crate::store::{Store, StoreStats};

/// Routes requests to the shared store
///
/// ## Concurrency Model
///
/// The store has no internal synchronization. Every request takes the
/// `store` lock for its whole duration, so requests from concurrent
/// connections are applied one at a time.
///
/// `None` means the store has been closed.
pub struct Dispatcher {
    store: Mutex<Option<Store>>,
}

impl Dispatcher {
    /// Create a dispatcher over a fresh store
    pub fn new(initial_capacity: usize) -> Result<Self> {
        let store = Store::new(initial_capacity)?;
        Ok(Self::with_store(store))
    }

    /// Create a dispatcher over an existing store
    pub fn with_store(store: Store) -> Self {
        Self {
            store: Mutex::new(Some(store)),
        }
    }

    /// Decode and execute one raw request
    pub fn handle(&self, bytes: &[u8]) -> Response {
        match decode_request(bytes) {
            Ok(request) => self.dispatch(request),
            Err(e) => Self::reject(e),
        }
    }

    /// Response for a request that failed to decode
    pub fn reject(error: ParseError) -> Response {
        let response = Response::parse_error(error);
        tracing::error!("{} {}", response.status, response.body_text());
        response
    }

    /// Execute a decoded request
    pub fn dispatch(&self, request: Request) -> Response {
        let mut guard = self.store.lock();
        let store = match guard.as_mut() {
            Some(store) => store,
            None => {
                tracing::error!(
                    "Received {} request after the store was closed",
                    request.operation()
                );
                return Response::internal_error("Store is closed.");
            }
        };

        match request {
            Request::Get { key } => Self::get(store, &key),
            Request::Put { key, value } => Self::put(store, &key, &value),
            Request::Del { key } => Self::delete(store, &key),
        }
    }

    fn get(store: &Store, key: &[u8]) -> Response {
        if key.is_empty() {
            tracing::error!("Invalid GET request: Key is empty.");
            return Response::no_key();
        }

        let key_text = String::from_utf8_lossy(key);
        tracing::info!("Received GET request for key: {}", key_text);

        match store.get(key) {
            Some(value) => Response::value(value),
            None => {
                tracing::info!("Key '{}' not found.", key_text);
                Response::not_found()
            }
        }
    }

    fn put(store: &mut Store, key: &[u8], value: &[u8]) -> Response {
        if key.is_empty() || value.is_empty() {
            tracing::error!("Invalid PUT request: Key or value is empty.");
            return Response::empty_put();
        }

        let key_text = String::from_utf8_lossy(key);
        tracing::info!("Received PUT request for key: {}", key_text);

        if let Err(e) = store.put(key, value) {
            tracing::error!("Failed to store key: {}, reason: {}", key_text, e);
            return Response::store_failed(key, e);
        }

        tracing::info!("Key '{}' stored successfully.", key_text);
        Self::log_status(store);
        Response::created()
    }

    fn delete(store: &mut Store, key: &[u8]) -> Response {
        if key.is_empty() {
            tracing::error!("Invalid DEL request: Key is empty.");
            return Response::no_key();
        }

        let key_text = String::from_utf8_lossy(key);
        tracing::info!("Received DEL request for key: {}", key_text);

        match store.delete(key) {
            Ok(()) => {
                Self::log_status(store);
                Response::deleted()
            }
            Err(StoreError::NotFound) => {
                tracing::info!("Key '{}' not found.", key_text);
                Response::not_found()
            }
            Err(e) => {
                tracing::error!("Failed to delete key: {}, reason: {}", key_text, e);
                Response::internal_error(&format!("Failed to delete key, reason: {}", e))
            }
        }
    }

    fn log_status(store: &Store) {
        let stats = store.stats();
        tracing::debug!(
            "kvstore status -> live='{}' size='{}' capacity='{}'",
            stats.live,
            stats.size,
            stats.capacity
        );
    }

    /// Release the store
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        match self.store.lock().take() {
            Some(store) => {
                let stats = store.close();
                tracing::debug!("Key value store freed ({} entries).", stats.live);
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.store.lock().is_none()
    }

    /// Occupancy of the store, `None` once closed
    pub fn stats(&self) -> Option<StoreStats> {
        self.store.lock().as_ref().map(Store::stats)
    }
}
