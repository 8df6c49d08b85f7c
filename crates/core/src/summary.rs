//! Text renderings of a [`WorkflowStatusReport`] for team notifications.
//!
//! [`render_status_update`] produces a deterministic Slack-formatted message.
//! [`analysis_prompt`] and [`deployment_prompt`] build the two prompts used
//! when the summary is delegated to a text-completion provider instead.

use std::fmt::Write;

use crate::workflow::{RunOutcome, WorkflowStatusReport, WorkflowSummary, NO_EVENTS_MESSAGE};

/// Overall CI health derived from the latest run of every workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallHealth {
    Good,
    Warning,
    Critical,
}

impl OverallHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallHealth::Good => "Good",
            OverallHealth::Warning => "Warning",
            OverallHealth::Critical => "Critical",
        }
    }

    /// Any failed run is critical; anything unfinished or inconclusive is a
    /// warning.
    pub fn from_report(report: &WorkflowStatusReport) -> Self {
        let mut health = OverallHealth::Good;
        for summary in report.summaries() {
            match summary.outcome() {
                RunOutcome::Failed => return OverallHealth::Critical,
                RunOutcome::InProgress | RunOutcome::Other => health = OverallHealth::Warning,
                RunOutcome::Succeeded => {}
            }
        }
        health
    }
}

/// Render a deployment update message for a messaging webhook.
pub fn render_status_update(report: &WorkflowStatusReport) -> String {
    if report.is_no_events() {
        return NO_EVENTS_MESSAGE.to_string();
    }

    let health = OverallHealth::from_report(report);
    let status = match health {
        OverallHealth::Critical => ":x: Failed",
        OverallHealth::Warning
            if report
                .summaries()
                .any(|s| s.outcome() == RunOutcome::InProgress) =>
        {
            ":hourglass_flowing_sand: In Progress"
        }
        OverallHealth::Warning => ":warning: Needs attention",
        OverallHealth::Good => ":white_check_mark: Success",
    };

    let mut out = String::new();
    let _ = writeln!(out, ":rocket: *Deployment Update*");
    let _ = writeln!(out, "- *Status*: {status}");
    let _ = writeln!(out, "- *Overall Health*: {}", health.as_str());

    for (label, outcome) in [
        ("Failed Workflows", RunOutcome::Failed),
        ("In Progress", RunOutcome::InProgress),
        ("Successful Workflows", RunOutcome::Succeeded),
        ("Other", RunOutcome::Other),
    ] {
        let lines: Vec<String> = report
            .summaries()
            .filter(|s| s.outcome() == outcome)
            .map(summary_line)
            .collect();
        if lines.is_empty() {
            continue;
        }
        let _ = writeln!(out, "- *{label}*:");
        for line in lines {
            let _ = writeln!(out, "  - {line}");
        }
    }

    if health == OverallHealth::Critical {
        let _ = writeln!(out, "- *Next Steps*: inspect the failed runs linked above");
    }

    out.trim_end().to_string()
}

/// One bullet for a workflow: `<url|build #12>: completed (failure)`.
fn summary_line(summary: &WorkflowSummary) -> String {
    let state = match &summary.conclusion {
        Some(conclusion) => format!("{} ({conclusion})", summary.status),
        None => summary.status.clone(),
    };
    format!(
        "<{}|{} #{}>: {state}",
        summary.html_url, summary.name, summary.run_number
    )
}

/// First-stage prompt: ask for an analysis of the raw status JSON.
pub fn analysis_prompt(report: &WorkflowStatusReport) -> String {
    let status_json =
        serde_json::to_string_pretty(&report.to_json()).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Analyze recent CI/CD results and provide insights.\n\n\
         Format your response as:\n\
         ## CI/CD Status Summary\n\
         - **Overall Health**: [Good/Warning/Critical]\n\
         - **Failed Workflows**: [List any failures with links]\n\
         - **Successful Workflows**: [List recent successes]\n\
         - **Recommendations**: [Specific actions to take]\n\
         - **Trends**: [Any patterns you notice]\n\n\
         The CI results are:\n{status_json}"
    )
}

/// Second-stage prompt: turn an analysis into a short team message.
pub fn deployment_prompt(analysis: &str) -> String {
    format!(
        "Format as a concise message suitable for Slack based on the CI results below.\n\n\
         **Deployment Update**\n\
         - **Status**: [Success / Failed / In Progress]\n\
         - **Environment**: [Production/Staging/Dev]\n\
         - **Version/Commit**: [If available from workflow data]\n\
         - **Duration**: [If available]\n\
         - **Key Changes**: [Brief summary if available]\n\
         - **Issues**: [Any problems encountered]\n\
         - **Next Steps**: [Required actions if failed]\n\
         Keep it brief but informative for team awareness.\n\n\
         The CI results are:\n{analysis}"
    )
}
