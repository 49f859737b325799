// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashSet;

// Layer 3: Internal module imports
// (none)

/// Static table of `(actor_type, method_name)` pairs with a registered
/// codec, populated once at silo construction. Presence here is what
/// lets the dispatcher distinguish `MethodNotFound` from a codec bug
/// without ever scanning types.
///
/// # Example
/// ```rust
/// use quark::codec::CodecRegistry;
///
/// let registry = CodecRegistry::new();
/// registry.register("Counter", "increment");
/// assert!(registry.contains("Counter", "increment"));
/// assert!(!registry.contains("Counter", "reset"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct CodecRegistry {
    methods: Arc<DashSet<(String, String)>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, actor_type: impl Into<String>, method_name: impl Into<String>) {
        self.methods.insert((actor_type.into(), method_name.into()));
    }

    pub fn contains(&self, actor_type: &str, method_name: &str) -> bool {
        self.methods
            .contains(&(actor_type.to_string(), method_name.to_string()))
    }
}
