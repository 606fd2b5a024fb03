#![forbid(unsafe_code)]

//! Logging facade for the layout crates.
//!
//! With the `tracing` feature the macros below are `tracing`'s own. Without it
//! they compile away, so library code can log unconditionally through
//! `gridboard_core::warn!(...)`. Every no-op expands to `()` and can stand in
//! expression position, e.g. as a match arm.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {{}};
    }

    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {{}};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {{}};
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) so `.entered()` chains still type-check.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn disabled_macros_accept_structured_fields() {
        let widgets = 3_usize;
        crate::debug!(widgets, "packing");
        crate::warn!(target: "gridboard", widgets = widgets, "no room");
        let _guard = crate::debug_span!("auto_sort", widgets).entered();
    }

    #[test]
    fn disabled_macros_are_unit_expressions() {
        let fitted = |fits: Option<u16>| match fits {
            Some(col) => col,
            None => {
                let () = crate::debug!(reason = "full", "no room");
                0
            }
        };
        assert_eq!(fitted(Some(4)), 4);
        assert_eq!(fitted(None), 0);
        let _arm: () = match fitted(None) {
            0 => crate::trace!("empty"),
            _ => crate::info!("placed"),
        };
    }
}
