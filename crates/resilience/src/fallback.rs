//! Fixed value returned when a protected call cannot produce one.

use std::fmt;
use std::sync::Arc;

use crate::error::ResilienceError;

/// Hook invoked with the call context and the failure reason whenever the
/// fallback value is used.
pub type FallbackHook<C> = Arc<dyn Fn(&C, &str) + Send + Sync>;

/// Converts any [`ResilienceError`] into a predetermined value.
///
/// `C` is whatever context identifies the call (for example its arguments);
/// it is handed to the hook so the failure can be reported.
pub struct Fallback<T, C> {
    name: String,
    value: T,
    hook: Option<FallbackHook<C>>,
}

impl<T: Clone, C> Fallback<T, C> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
            hook: None,
        }
    }

    /// Installs the hook called on every fallback, replacing any earlier one.
    pub fn on_fallback<H>(mut self, hook: H) -> Self
    where
        H: Fn(&C, &str) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the successful value, or the fallback value after reporting
    /// the failure.
    pub fn recover<E: fmt::Display>(&self, context: &C, result: Result<T, ResilienceError<E>>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                metrics::counter!(
                    "resilience_fallbacks_total",
                    "name" => self.name.clone(),
                    "reason" => err.kind()
                )
                .increment(1);

                if let Some(hook) = &self.hook {
                    hook(context, &err.to_string());
                }
                self.value.clone()
            }
        }
    }
}

impl<T: Clone, C> Clone for Fallback<T, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
            hook: self.hook.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Fallback<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fallback")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
