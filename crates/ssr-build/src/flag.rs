//! Process-wide SSR flag.
//!
//! Set by the serving process so build steps that run inside it (template
//! selection, spawn gating) treat every app as server-rendered.

use std::sync::atomic::{AtomicBool, Ordering};

static SSR_MODE: AtomicBool = AtomicBool::new(false);

/// Mark this process as running the SSR bridge.
pub fn enable_ssr_mode() {
    SSR_MODE.store(true, Ordering::SeqCst);
}

pub fn is_ssr_mode() -> bool {
    SSR_MODE.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_is_sticky() {
        enable_ssr_mode();
        enable_ssr_mode();

        assert!(is_ssr_mode());
    }
}
