//! # Carrier Registry
//!
//! Map from [`Carrier`] to its adapter, built once at startup and read-only
//! afterwards.

use crate::domain::value_objects::Carrier;
use crate::infrastructure::carriers::traits::CarrierAdapter;
use std::collections::HashMap;
use std::sync::Arc;

/// Registered carrier adapters.
///
/// # Examples
///
/// ```
/// use shipquote::infrastructure::carriers::registry::CarrierRegistry;
/// use shipquote::domain::value_objects::Carrier;
///
/// let registry = CarrierRegistry::new();
/// assert!(registry.get(Carrier::Frenet).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CarrierRegistry {
    adapters: HashMap<Carrier, Arc<dyn CarrierAdapter>>,
}

impl CarrierRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an adapter, replacing any adapter registered for the same carrier.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn CarrierAdapter>) -> Self {
        self.adapters.insert(adapter.carrier(), adapter);
        self
    }

    /// Looks up the adapter for a carrier.
    #[must_use]
    pub fn get(&self, carrier: Carrier) -> Option<Arc<dyn CarrierAdapter>> {
        self.adapters.get(&carrier).cloned()
    }

    /// Registered carriers in declaration order.
    #[must_use]
    pub fn carriers(&self) -> Vec<Carrier> {
        let mut carriers: Vec<Carrier> = self.adapters.keys().copied().collect();
        carriers.sort();
        carriers
    }

    /// Number of registered adapters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapter is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
