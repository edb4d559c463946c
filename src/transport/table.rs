//! Endpoint table mapping method names to endpoints.
//!
//! Every binding gets a unique id, so a stale [`Binding`] handle can never
//! remove an endpoint bound later under the same name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::MethodEndpoint;
use crate::error::{FuncwireError, Result};
use crate::request::InvokeRequest;
use crate::response::InvokeResponse;

/// Entry for a bound method.
struct EndpointEntry {
    /// Binding id, unique per table.
    id: u64,
    endpoint: Arc<dyn MethodEndpoint>,
}

/// Table of bound method endpoints.
pub struct EndpointTable {
    entries: RwLock<HashMap<String, EndpointEntry>>,
    next_id: AtomicU64,
}

impl EndpointTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1), // 0 is never handed out
        }
    }

    /// Bind `endpoint` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FuncwireError::AlreadyBound`] if `name` is taken.
    pub fn bind(
        table: &Arc<EndpointTable>,
        name: &str,
        endpoint: Arc<dyn MethodEndpoint>,
    ) -> Result<Binding> {
        let mut entries = table.entries.write();
        if entries.contains_key(name) {
            return Err(FuncwireError::AlreadyBound(name.to_string()));
        }

        let id = table.next_id.fetch_add(1, Ordering::Relaxed);
        entries.insert(name.to_string(), EndpointEntry { id, endpoint });

        Ok(Binding {
            name: name.to_string(),
            id,
            table: Arc::downgrade(table),
            released: false,
        })
    }

    /// Get the endpoint bound under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn MethodEndpoint>> {
        self.entries.read().get(name).map(|e| e.endpoint.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Names of all bound methods.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Dispatch a call to the endpoint bound under `name`.
    pub async fn dispatch(&self, name: &str, request: InvokeRequest) -> Result<InvokeResponse> {
        let endpoint = self
            .get(name)
            .ok_or_else(|| FuncwireError::MethodNotFound(name.to_string()))?;

        endpoint.call(request).await
    }

    /// Remove the entry for `name` only if it still carries binding `id`.
    fn remove(&self, name: &str, id: u64) -> bool {
        let mut entries = self.entries.write();
        match entries.get(name) {
            Some(entry) if entry.id == id => {
                entries.remove(name);
                true
            }
            _ => false,
        }
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a bound endpoint.
///
/// Unbinds on drop.
#[must_use = "dropping a Binding unbinds the endpoint"]
pub struct Binding {
    name: String,
    id: u64,
    table: Weak<EndpointTable>,
    released: bool,
}

impl Binding {
    /// Method name this binding holds.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the endpoint is still bound.
    pub fn is_bound(&self) -> bool {
        match self.table.upgrade() {
            Some(table) => table
                .entries
                .read()
                .get(&self.name)
                .is_some_and(|e| e.id == self.id),
            None => false,
        }
    }

    /// Unbind the endpoint. Returns `false` if it was already gone.
    pub fn unbind(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        match self.table.upgrade() {
            Some(table) => table.remove(&self.name, self.id),
            None => false,
        }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}
