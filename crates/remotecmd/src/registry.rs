use crate::{
    error::{Error, Result},
    operation::Operation,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the listing operation. Also installed as the default route.
pub const HELP_NAME: &str = "/help";

/// Name of the status-reporting operation.
pub const STATUS_NAME: &str = "/status";

/// The set of known operations and the routes that reach them.
///
/// Operations are kept sorted by name so listings are stable. Every operation
/// is routable under its own name; the one named [`HELP_NAME`] additionally
/// catches every name that matches nothing else.
#[derive(Debug, Default)]
pub struct Registry {
    operations: Vec<Arc<Operation>>,
    routes: HashMap<String, Arc<Operation>>,
    default_route: Option<Arc<Operation>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `operation`, keeps the collection sorted by name and installs its
    /// route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateOperation`] if the name is already taken.
    pub fn register(&mut self, operation: Operation) -> Result<Arc<Operation>> {
        if self.routes.contains_key(operation.name()) {
            return Err(Error::DuplicateOperation {
                name: operation.name().to_owned(),
            });
        }

        let operation = Arc::new(operation);
        self.operations.push(operation.clone());
        // Registration only happens at startup, so a full re-sort is fine.
        self.operations
            .sort_unstable_by(|a, b| a.name().cmp(b.name()));

        self.routes
            .insert(operation.name().to_owned(), operation.clone());
        if operation.name() == HELP_NAME {
            self.default_route = Some(operation.clone());
        }

        tracing::debug!(operation = operation.name(), "registered operation");
        Ok(operation)
    }

    /// Finds the operation routed under `name`, falling back to the default
    /// route.
    pub fn resolve(&self, name: &str) -> Option<Arc<Operation>> {
        self.routes
            .get(name)
            .or(self.default_route.as_ref())
            .cloned()
    }

    /// Every registered operation, sorted by name.
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Request;

    fn op(name: &str) -> Operation {
        Operation::from_fn(name, format!("{name} doc"), |_req: Request| async {
            Ok(String::new())
        })
    }

    #[test]
    fn keeps_operations_sorted_by_name() {
        let mut registry = Registry::new();
        for name in ["/time", "/cpu", "/say", "/help"] {
            registry.register(op(name)).unwrap();
        }

        let names: Vec<_> = registry.operations().iter().map(|o| o.name()).collect();
        assert_eq!(names, ["/cpu", "/help", "/say", "/time"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = Registry::new();
        registry.register(op("/time")).unwrap();
        assert_eq!(
            registry.register(op("/time")).unwrap_err(),
            Error::DuplicateOperation {
                name: "/time".into()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_names_fall_back_to_help() {
        let mut registry = Registry::new();
        registry.register(op("/time")).unwrap();
        assert!(registry.resolve("/nope").is_none());

        registry.register(op(HELP_NAME)).unwrap();
        assert_eq!(registry.resolve("/time").unwrap().name(), "/time");
        assert_eq!(registry.resolve("/nope").unwrap().name(), HELP_NAME);
        assert_eq!(registry.resolve("/").unwrap().name(), HELP_NAME);
    }
}
