//! Insertion-ordered handler storage keyed by unique name.

use crate::control_plane::lifecycle::Lifecycle;
use crate::error::RouterError;
use crate::handler::HandlerBinding;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default)]
struct Bindings {
    ordered: Vec<Arc<HandlerBinding>>,
    names: HashSet<String>,
}

pub(crate) struct HandlerRegistry {
    bindings: Mutex<Bindings>,
}

impl HandlerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            bindings: Mutex::new(Bindings::default()),
        }
    }

    /// Adds a binding while the router is still configurable.
    ///
    /// The lifecycle check happens under the registry lock, so a binding accepted
    /// here is always part of the snapshot taken by a concurrent `run`.
    pub(crate) fn insert(
        &self,
        binding: Arc<HandlerBinding>,
        lifecycle: &Lifecycle,
    ) -> Result<(), RouterError> {
        let mut bindings = self.bindings.lock();
        lifecycle.ensure_configurable()?;

        if !bindings.names.insert(binding.name.clone()) {
            return Err(RouterError::DuplicateHandlerName(binding.name.clone()));
        }
        bindings.ordered.push(binding);
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<HandlerBinding>> {
        self.bindings.lock().ordered.clone()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.bindings
            .lock()
            .ordered
            .iter()
            .map(|binding| binding.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::HandlerRegistry;
    use crate::control_plane::lifecycle::Lifecycle;
    use crate::error::RouterError;
    use crate::handler::HandlerBinding;
    use crate::middleware::handler_fn;
    use crate::test_support::FeedSubscriber;
    use crate::Message;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn binding(name: &str) -> Arc<HandlerBinding> {
        Arc::new(HandlerBinding::new(
            name.to_string(),
            "in".to_string(),
            Arc::new(FeedSubscriber::default()),
            None,
            handler_fn(|_message: Message| async move { Ok(Vec::new()) }),
            CancellationToken::new(),
        ))
    }

    #[test]
    fn names_keep_insertion_order() {
        let registry = HandlerRegistry::new();
        let lifecycle = Lifecycle::new();

        for name in ["zeta", "alpha", "mid"] {
            registry
                .insert(binding(name), &lifecycle)
                .expect("unique name is accepted");
        }

        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_name_is_rejected_and_not_added() {
        let registry = HandlerRegistry::new();
        let lifecycle = Lifecycle::new();
        registry
            .insert(binding("echo"), &lifecycle)
            .expect("first insert succeeds");

        let result = registry.insert(binding("echo"), &lifecycle);

        assert!(matches!(
            result,
            Err(RouterError::DuplicateHandlerName(name)) if name == "echo"
        ));
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[test]
    fn insert_after_run_began_is_rejected() {
        let registry = HandlerRegistry::new();
        let lifecycle = Lifecycle::new();
        lifecycle.begin_run().expect("run starts");

        let result = registry.insert(binding("late"), &lifecycle);

        assert!(matches!(result, Err(RouterError::AlreadyStarted)));
        assert!(registry.snapshot().is_empty());
    }
}
