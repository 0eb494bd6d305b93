use crate::runner::context::ContextMode;
use crate::runner::result::{ExecutionResult, TestStatus};
use crate::runner::scheduler::SuiteRunResult;

/// Format a status label for terminal output.
fn status_label(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pending => "PENDING",
        TestStatus::Running => "RUNNING",
        TestStatus::Passed => "PASSED",
        TestStatus::Failed => "FAILED",
        TestStatus::Skipped => "SKIPPED",
    }
}

/// Format the run header line.
pub fn format_run_header(suite: &str, mode: ContextMode) -> String {
    let mode = match mode {
        ContextMode::Shared => "shared session",
        ContextMode::Isolated => "isolated sessions",
    };
    format!("Running {suite} ({mode})...\n")
}

/// Display a progress line for a test about to execute.
pub fn format_test_start(name: &str, order: usize, total: usize) -> String {
    format!("  [{order}/{total}] {name} ...")
}

/// Format a test result as it concludes.
pub fn format_test_result(result: &ExecutionResult) -> String {
    let status = status_label(result.status);
    let duration_secs = result.duration.as_secs_f64();
    let mut line = format!(
        "  [{status}] {} [{}] ({duration_secs:.1}s)",
        result.name, result.priority
    );

    if let Some(error) = &result.error {
        line.push_str(&format!("\n         → {}", error.message));
    }
    if let Some(reason) = &result.reason {
        line.push_str(&format!("\n         → {reason}"));
    }

    line
}

/// Format the final summary after the suite concludes.
pub fn format_summary(run: &SuiteRunResult) -> String {
    let duration_secs = run.total_duration.as_secs_f64();
    let mut parts = Vec::new();

    if run.stats.total_passed() > 0 {
        parts.push(format!("{} passed", run.stats.total_passed()));
    }
    if run.stats.total_failed() > 0 {
        parts.push(format!("{} failed", run.stats.total_failed()));
    }
    if run.stats.total_skipped() > 0 {
        parts.push(format!("{} skipped", run.stats.total_skipped()));
    }
    if parts.is_empty() {
        parts.push("0 tests".into());
    }

    format!(
        "\nResults: {} ({duration_secs:.1}s, pass rate {:.0}%)",
        parts.join(", "),
        run.pass_rate() * 100.0
    )
}
