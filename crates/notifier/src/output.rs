//! Terminal rendering for `preview` and pass reports

use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{Table, Tabled};
use walkin_core::application::{DispatchOutcome, RunReport};
use walkin_core::domain::{LocationId, NotificationDecision, NotificationKind};

#[derive(Debug, Serialize, Tabled)]
pub struct DecisionRow {
    location: String,
    entry: String,
    customer: String,
    phone: String,
    reason: String,
    message: String,
}

impl DecisionRow {
    fn from_decision(location_id: &str, decision: &NotificationDecision) -> Self {
        let reason = match &decision.kind {
            NotificationKind::NextForRequestedProvider { provider_id } => {
                format!("next for {}", provider_id)
            }
            NotificationKind::AlmostUp { position } => format!("any provider #{}", position),
        };
        Self {
            location: location_id.to_string(),
            entry: decision.entry.id.clone(),
            customer: decision.entry.customer_name.clone(),
            phone: decision.entry.phone_number.clone(),
            reason,
            message: decision.message.clone(),
        }
    }
}

pub fn decision_rows(
    decided: &BTreeMap<LocationId, Vec<NotificationDecision>>,
) -> Vec<DecisionRow> {
    decided
        .iter()
        .flat_map(|(location_id, decisions)| {
            decisions
                .iter()
                .map(move |d| DecisionRow::from_decision(location_id, d))
        })
        .collect()
}

pub fn preview_table(rows: Vec<DecisionRow>) -> String {
    if rows.is_empty() {
        return "No one to notify.".to_string();
    }
    Table::new(rows).to_string()
}

#[derive(Debug, Tabled)]
struct DispatchRow {
    location: String,
    entry: String,
    outcome: String,
}

fn outcome_text(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Delivered { message_id: Some(id) } => format!("delivered ({})", id),
        DispatchOutcome::Delivered { message_id: None } => "delivered".to_string(),
        DispatchOutcome::AlreadyMarked => "already marked".to_string(),
        DispatchOutcome::TransportFailed { reason } => format!("send failed: {}", reason),
        DispatchOutcome::MarkFailed { reason } => format!("mark failed: {}", reason),
    }
}

pub fn report_summary(report: &RunReport) -> String {
    let mut out = format!(
        "Run {}: {} decision(s), {} delivered, {} failed, {} anomal{}",
        report.run_id,
        report.decision_count(),
        report.dispatch.delivered(),
        report.dispatch.failures(),
        report.anomalies.len(),
        if report.anomalies.len() == 1 { "y" } else { "ies" },
    );

    if !report.dispatch.records.is_empty() {
        let rows: Vec<DispatchRow> = report
            .dispatch
            .records
            .iter()
            .map(|r| DispatchRow {
                location: r.location_id.clone(),
                entry: r.entry_id.clone(),
                outcome: outcome_text(&r.outcome),
            })
            .collect();
        out.push('\n');
        out.push_str(&Table::new(rows).to_string());
    }
    out
}
