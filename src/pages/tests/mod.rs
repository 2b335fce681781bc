mod search_results_tests;

use crate::config::{SuiteConfig, Timeouts};
use crate::driver::mock::MockDriver;
use crate::pages::PageContext;
use crate::report::Report;
use std::sync::Arc;
use tempfile::TempDir;

/// Timeouts small enough that absent elements fail fast
pub(crate) fn fast_timeouts() -> Timeouts {
    Timeouts {
        interaction_ms: 50,
        visibility_probe_ms: 20,
        popup_probe_ms: 10,
        settle_ms: 0,
        short_settle_ms: 0,
        poll_interval_ms: 5,
    }
}

pub(crate) fn test_config(dir: &TempDir) -> SuiteConfig {
    SuiteConfig {
        timeouts: fast_timeouts(),
        screenshots_dir: dir.path().join("screenshots"),
        reports_dir: dir.path().join("reports"),
        variant_seed: Some(7),
        ..SuiteConfig::default()
    }
}

/// A page context over `driver`, writing screenshots into a fresh temp dir
pub(crate) fn context(driver: MockDriver) -> (PageContext<MockDriver>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let ctx = PageContext::new(Arc::new(driver), Arc::new(config), Report::new());
    (ctx, dir)
}
