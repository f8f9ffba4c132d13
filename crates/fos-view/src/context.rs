//! Application context
//!
//! Typed values (current user, app services, ...) handed to every view
//! through its stage instead of module globals.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Typed map of shared application values, one per type
#[derive(Clone, Default)]
pub struct AppContext {
    values: HashMap<TypeId, Rc<dyn Any>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `provide`
    pub fn with<T: 'static>(mut self, value: T) -> Self {
        self.provide(value);
        self
    }

    /// Store a value, replacing any previous value of the same type
    pub fn provide<T: 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Rc::new(value));
    }

    /// Shared value of type `T`
    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        let value = self.values.get(&TypeId::of::<T>())?;
        Rc::clone(value).downcast::<T>().ok()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("values", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct CurrentUser(&'static str);

    #[test]
    fn test_typed_lookup() {
        let context = AppContext::new().with(CurrentUser("ada")).with(42u32);
        assert_eq!(context.get::<CurrentUser>().as_deref(), Some(&CurrentUser("ada")));
        assert_eq!(context.get::<u32>().as_deref(), Some(&42));
        assert!(context.get::<String>().is_none());
    }

    #[test]
    fn test_provide_replaces() {
        let mut context = AppContext::new();
        context.provide(CurrentUser("a"));
        context.provide(CurrentUser("b"));
        assert_eq!(context.get::<CurrentUser>().unwrap().0, "b");
        assert!(context.contains::<CurrentUser>());
    }
}
