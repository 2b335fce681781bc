use crate::config::SuiteConfig;
use crate::driver::Session;
use crate::error::Result;
use crate::pages::PageContext;
use crate::report::{Report, RunReport, ScenarioOutcome, Status};
use crate::scenario::{Scenario, ShoppingFlow};
use std::sync::Arc;

/// Runs every scenario in order, each on a fresh page
///
/// A failing scenario is recorded and the run moves on; pages are released
/// whether or not their scenario passed.
pub async fn run_scenarios<S: Session>(
    session: &S,
    config: Arc<SuiteConfig>,
    scenarios: &[Scenario],
) -> RunReport {
    let report = Report::new();
    let mut run = RunReport::default();

    for scenario in scenarios {
        report.begin(&scenario.name, &scenario.description);
        let result = run_one(session, Arc::clone(&config), &report, scenario).await;

        let outcome = match result {
            Ok(()) => report.finish(Status::Passed, None),
            Err(e) => report.finish(Status::Failed, Some(e.to_string())),
        };
        run.scenarios.extend(outcome);
    }

    ::log::info!(
        "Ran {} scenarios: {} passed, {} failed",
        run.scenarios.len(),
        run.passed(),
        run.failed()
    );
    run
}

async fn run_one<S: Session>(
    session: &S,
    config: Arc<SuiteConfig>,
    report: &Report,
    scenario: &Scenario,
) -> Result<()> {
    let page = Arc::new(session.open_page().await?);
    let ctx = PageContext::new(Arc::clone(&page), config, report.clone());

    let mut flow = ShoppingFlow::new(&ctx);
    let result = flow.run(scenario).await;
    if result.is_err() {
        flow.capture_failure(&scenario.name).await;
    }

    if let Err(e) = session.close_page(&page).await {
        ::log::warn!("Failed to close page for {}: {}", scenario.name, e);
    }
    result
}

/// Short summary lines for the console
pub fn summary(run: &RunReport) -> Vec<String> {
    run.scenarios.iter().map(summary_line).collect()
}

fn summary_line(outcome: &ScenarioOutcome) -> String {
    match outcome.status {
        Status::Passed => format!("PASSED {} ({}ms)", outcome.name, outcome.duration_ms),
        Status::Failed => format!(
            "FAILED {} ({}ms): {}",
            outcome.name,
            outcome.duration_ms,
            outcome.message.as_deref().unwrap_or("")
        ),
    }
}
