//! Path to handler registry
//!
//! Two independent namespaces: readable paths and writable paths. Lookups
//! ignore case but are otherwise exact (no wildcards, no trailing-slash
//! normalization).

use remote_control_core::HandlerError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Host function producing the current value of a property
pub type ReadHandler = Arc<dyn Fn() -> Result<String, HandlerError> + Send + Sync>;

/// Host function validating and applying a new value
pub type WriteHandler = Arc<dyn Fn(&str) -> Result<(), HandlerError> + Send + Sync>;

/// Registered handler together with the path as it was registered
struct Entry<H> {
    path: String,
    handler: H,
}

/// Registry of read and write handlers.
///
/// Built before the server starts and shared read-only afterwards, so
/// lookups need no locking.
#[derive(Default)]
pub struct HandlerRegistry {
    readers: HashMap<String, Entry<ReadHandler>>,
    writers: HashMap<String, Entry<WriteHandler>>,
}

fn key(path: &str) -> String {
    path.to_lowercase()
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a read handler, replacing any earlier one for the same path
    pub fn register_read<F, E>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn() -> Result<String, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let path = path.into();
        let handler: ReadHandler =
            Arc::new(move || handler().map_err(|e| HandlerError::new(e.to_string())));
        self.readers.insert(key(&path), Entry { path, handler });
        self
    }

    /// Register a write handler, replacing any earlier one for the same path
    pub fn register_write<F, E>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&str) -> Result<(), E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let path = path.into();
        let handler: WriteHandler = Arc::new(move |value: &str| {
            handler(value).map_err(|e| HandlerError::new(e.to_string()))
        });
        self.writers.insert(key(&path), Entry { path, handler });
        self
    }

    /// Look up the read handler for a path
    pub fn reader(&self, path: &str) -> Option<&ReadHandler> {
        self.readers.get(&key(path)).map(|entry| &entry.handler)
    }

    /// Look up the write handler for a path
    pub fn writer(&self, path: &str) -> Option<&WriteHandler> {
        self.writers.get(&key(path)).map(|entry| &entry.handler)
    }

    /// Readable paths, sorted, as registered
    pub fn readable_paths(&self) -> Vec<&str> {
        sorted_paths(&self.readers)
    }

    /// Writable paths, sorted, as registered
    pub fn writable_paths(&self) -> Vec<&str> {
        sorted_paths(&self.writers)
    }

    /// Total number of registrations across both namespaces
    pub fn len(&self) -> usize {
        self.readers.len() + self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sorted_paths<H>(entries: &HashMap<String, Entry<H>>) -> Vec<&str> {
    let mut paths: Vec<&str> = entries.values().map(|e| e.path.as_str()).collect();
    paths.sort_unstable();
    paths
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("readable", &self.readable_paths())
            .field("writable", &self.writable_paths())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn constant(value: &'static str) -> impl Fn() -> Result<String, Infallible> {
        move || Ok(value.to_string())
    }

    #[test]
    fn test_lookup_ignores_case() {
        let mut registry = HandlerRegistry::new();
        registry.register_read("/control/throttle", constant("0.5"));

        let handler = registry.reader("/CONTROL/Throttle").unwrap();
        assert_eq!(handler().unwrap(), "0.5");
    }

    #[test]
    fn test_lookup_is_otherwise_exact() {
        let mut registry = HandlerRegistry::new();
        registry.register_read("/x", constant("1"));

        assert!(registry.reader("/x/").is_none());
        assert!(registry.reader("x").is_none());
        assert!(registry.reader("/x*").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_read("/x", constant("first"))
            .register_read("/X", constant("second"));

        assert_eq!(registry.reader("/x").unwrap()().unwrap(), "second");
        assert_eq!(registry.readable_paths(), vec!["/X"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut registry = HandlerRegistry::new();
        registry.register_read("/r", constant("1"));
        registry.register_write("/w", |_: &str| Ok::<(), Infallible>(()));

        assert!(registry.reader("/r").is_some());
        assert!(registry.writer("/r").is_none());
        assert!(registry.writer("/w").is_some());
        assert!(registry.reader("/w").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_handler_errors_are_converted() {
        let mut registry = HandlerRegistry::new();
        registry.register_write("/n", |value: &str| value.parse::<i32>().map(|_| ()));

        let err = registry.writer("/n").unwrap()("abc").unwrap_err();
        assert_eq!(err.message(), "invalid digit found in string");
    }

    #[test]
    fn test_debug_lists_paths() {
        let mut registry = HandlerRegistry::new();
        registry.register_read("/b", constant(""));
        registry.register_read("/a", constant(""));

        let debug = format!("{:?}", registry);
        assert!(debug.contains("[\"/a\", \"/b\"]"), "{}", debug);
    }
}
