use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

use crate::error::DataAccessError;

/// Shared flag telling whether the owning view is still mounted.
#[derive(Clone, Debug)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub fn dispose(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Rows a view holds for rendering, plus the inline error banner.
///
/// Fetch results land through [`ViewState::resolve`]; once the view is
/// disposed, late results are dropped instead of written.
#[derive(Debug)]
pub struct ViewState<T> {
    data: T,
    loaded: bool,
    error: Option<String>,
    mounted: MountHandle,
}

impl<T> ViewState<T> {
    pub fn new(initial: T) -> Self {
        Self {
            data: initial,
            loaded: false,
            error: None,
            mounted: MountHandle(Arc::new(AtomicBool::new(true))),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mounted.clone()
    }

    pub fn dispose(&self) {
        self.mounted.dispose();
    }

    /// Start of an activation; clears the previous banner.
    pub fn begin(&mut self) {
        if self.mounted.is_mounted() {
            self.error = None;
        }
    }

    /// Folds a fetch result into the held data. Failures keep the previous
    /// data and set the banner. Returns whether anything was applied.
    pub fn resolve<V>(
        &mut self,
        what: &str,
        result: Result<V, DataAccessError>,
        merge: impl FnOnce(&mut T, V),
    ) -> bool {
        if !self.mounted.is_mounted() {
            debug!(what, "view disposed before fetch resolved; dropping result");
            return false;
        }

        self.loaded = true;
        match result {
            Ok(value) => {
                merge(&mut self.data, value);
                true
            }
            Err(e) => {
                error!(what, error = %e, "fetch failed; keeping previous rows");
                self.error = Some(format!("Could not load {what}. Please try again."));
                false
            }
        }
    }

    pub fn replace(&mut self, what: &str, result: Result<T, DataAccessError>) -> bool {
        self.resolve(what, result, |data, value| *data = value)
    }
}
