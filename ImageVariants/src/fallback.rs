//! Fallback image loading
//!
//! Each rendered image owns one [`FallbackImageLoad`]. It starts by loading
//! the optimized variant, falls back to the full-resolution re-encode when
//! that fails, and finally settles on a placeholder icon:
//!
//! ```text
//! OptimizedSize --fail--> FallbackOriginal --fail--> Placeholder
//!       |                        |
//!       +------fail (no fallback)+----------------------^
//! ```
//!
//! States only move forward and none is visited twice. A successful load
//! freezes the current state. The failure callback runs at most once per
//! mount, when the placeholder is reached after a failed load.

use std::fmt;

use crate::naming::SizeName;
use crate::resolver;

/// Which source a rendered image is currently using
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadAttemptState {
    OptimizedSize,
    FallbackOriginal,
    Placeholder,
}

impl LoadAttemptState {
    /// State after a load failure
    pub fn after_failure(self, fallback_available: bool) -> Self {
        match self {
            Self::OptimizedSize if fallback_available => Self::FallbackOriginal,
            Self::OptimizedSize | Self::FallbackOriginal | Self::Placeholder => Self::Placeholder,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Load outcome reported by the image element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded,
    Failed,
}

/// Fallback state machine for one rendered image
pub struct FallbackImageLoad<F: FnMut()> {
    reference: String,
    size: SizeName,
    fallback: Option<String>,
    state: LoadAttemptState,
    settled: bool,
    failure_reported: bool,
    history: Vec<LoadAttemptState>,
    on_failure: F,
}

impl<F: FnMut()> FallbackImageLoad<F> {
    /// Mount an image
    ///
    /// `fallback` is an explicit alternative reference; without one the
    /// fallback is `reference` itself at `original` size. `on_failure` is
    /// called when the placeholder is reached after a failed load.
    pub fn new(
        reference: impl Into<String>,
        size: SizeName,
        fallback: Option<String>,
        on_failure: F,
    ) -> Self {
        let mut load = Self {
            reference: reference.into(),
            size,
            fallback: fallback.filter(|f| !f.is_empty()),
            state: LoadAttemptState::OptimizedSize,
            settled: false,
            failure_reported: false,
            history: Vec::new(),
            on_failure,
        };
        load.mount();
        load
    }

    /// Reset to the initial state, as when the image is mounted again
    pub fn remount(&mut self) {
        self.settled = false;
        self.failure_reported = false;
        self.history.clear();
        self.mount();
    }

    fn mount(&mut self) {
        self.state = LoadAttemptState::OptimizedSize;
        self.history.push(self.state);

        // Nothing to request: move on without reporting a failed load
        if self.optimized_url().is_empty() {
            let next = self.state.after_failure(self.fallback_url().is_some());
            self.enter(next);
        }
    }

    pub fn state(&self) -> LoadAttemptState {
        self.state
    }

    /// Every state entered since mounting, in order
    pub fn history(&self) -> &[LoadAttemptState] {
        &self.history
    }

    /// Whether a load has succeeded
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn is_placeholder(&self) -> bool {
        self.state.is_terminal()
    }

    /// URL to request in the current state, `None` when showing the placeholder
    pub fn current_url(&self) -> Option<String> {
        match self.state {
            LoadAttemptState::OptimizedSize => Some(self.optimized_url()),
            LoadAttemptState::FallbackOriginal => self.fallback_url(),
            LoadAttemptState::Placeholder => None,
        }
    }

    fn optimized_url(&self) -> String {
        resolver::resolve(&self.reference, self.size)
    }

    /// Fallback URL, if one exists and differs from the optimized URL
    fn fallback_url(&self) -> Option<String> {
        let source = self.fallback.as_deref().unwrap_or(&self.reference);
        let url = resolver::resolve(source, SizeName::Original);
        if url.is_empty() || url == self.optimized_url() {
            None
        } else {
            Some(url)
        }
    }

    /// Feed a load outcome and return the resulting state
    pub fn handle(&mut self, event: LoadEvent) -> LoadAttemptState {
        match event {
            LoadEvent::Loaded => self.on_load(),
            LoadEvent::Failed => self.on_error(),
        }
    }

    /// The current URL loaded; no further transitions happen
    pub fn on_load(&mut self) -> LoadAttemptState {
        if !self.state.is_terminal() {
            self.settled = true;
        }
        self.state
    }

    /// The current URL failed to load
    pub fn on_error(&mut self) -> LoadAttemptState {
        if self.settled || self.state.is_terminal() {
            return self.state;
        }

        let next = self.state.after_failure(self.fallback_url().is_some());
        self.enter(next);

        if next.is_terminal() && !self.failure_reported {
            self.failure_reported = true;
            (self.on_failure)();
        }
        self.state
    }

    fn enter(&mut self, next: LoadAttemptState) {
        debug_assert!(next > self.state, "fallback states only move forward");
        self.state = next;
        self.history.push(next);
    }
}

impl<F: FnMut()> fmt::Debug for FallbackImageLoad<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackImageLoad")
            .field("reference", &self.reference)
            .field("size", &self.size)
            .field("fallback", &self.fallback)
            .field("state", &self.state)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}
