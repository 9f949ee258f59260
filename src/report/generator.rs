//! Text and JSON report generation.
//!
//! The text report has a fleet summary block followed by one table row
//! per node. Offline nodes show `N/A` in every column but the name.

use crate::models::HealthState;
use crate::report::{FleetReport, NodeReport};
use anyhow::Result;
use chrono::Duration;

const NOT_AVAILABLE: &str = "N/A";

const TABLE_HEADER: [&str; 11] = [
    "NAME",
    "ID",
    "Status",
    "Uptime",
    "Age",
    "Version",
    "Up To Date",
    "Disk Allocated / % Used",
    "Bandwidth Utilization",
    "Satellites C/S/D",
    "Vetting Progress",
];

/// Generate the complete text report.
pub fn render_text(report: &FleetReport) -> String {
    let mut output = String::new();

    output.push_str("Storage Node Fleet Summary\n");
    output.push_str("==========================\n\n");

    output.push_str(&generate_summary_section(report));

    if let Some(ref verdict) = report.compliance {
        output.push_str(&generate_compliance_section(verdict.state, &verdict.message()));
    }

    output.push_str(&generate_node_table(&report.nodes));

    output
}

/// Generate a JSON report.
pub fn render_json(report: &FleetReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the GENERAL / NODES / DISK / BANDWIDTH / LEGEND block.
fn generate_summary_section(report: &FleetReport) -> String {
    let stats = &report.statistics;
    let mut section = String::new();

    let blocks: [(&str, Vec<(&str, String)>); 5] = [
        (
            "GENERAL",
            vec![(
                "Current Period",
                report.generated_at.format("%B %Y").to_string(),
            )],
        ),
        (
            "NODES",
            vec![
                ("Total", stats.total_nodes.to_string()),
                ("Online", stats.online_nodes.to_string()),
                ("Up-To-Date", stats.up_to_date_nodes.to_string()),
            ],
        ),
        (
            "DISK",
            vec![
                ("Allocated", format_bytes(stats.disk_allocated, 1000)),
                ("Used", format_bytes(stats.disk_used, 1000)),
                ("Free", format_bytes(stats.disk_free(), 1000)),
            ],
        ),
        (
            "BANDWIDTH",
            vec![
                ("Egress", format_bytes(stats.bandwidth_egress, 1000)),
                ("Ingress", format_bytes(stats.bandwidth_ingress, 1000)),
                ("Utilization", format_bytes(stats.bandwidth_utilization, 1000)),
            ],
        ),
        (
            "LEGEND",
            vec![
                ("C/S/D", "Connected/Suspended/Disqualified".to_string()),
                (NOT_AVAILABLE, "Not Available".to_string()),
            ],
        ),
    ];

    for (title, rows) in blocks {
        section.push_str(&format!("{}\n", title));
        for (label, value) in rows {
            section.push_str(&format!("  {:<16}{}\n", label, value));
        }
        section.push('\n');
    }

    section
}

fn generate_compliance_section(state: HealthState, message: &str) -> String {
    format!("VERSION CHECK\n  {:<16}{}\n\n", state.to_string(), message)
}

/// Generate the per-node table with columns padded to fit.
fn generate_node_table(nodes: &[NodeReport]) -> String {
    let rows: Vec<Vec<String>> = nodes.iter().map(node_row).collect();

    let mut widths: Vec<usize> = TABLE_HEADER.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    let header: Vec<String> = TABLE_HEADER.iter().map(|h| h.to_string()).collect();
    table.push_str(&format_table_line(&header, &widths));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    table.push_str(&format_table_line(&rule, &widths));

    for row in &rows {
        table.push_str(&format_table_line(row, &widths));
    }

    table
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Render one node as table cells.
fn node_row(node: &NodeReport) -> Vec<String> {
    if !node.online {
        let mut row = vec![node.name.clone(), NOT_AVAILABLE.to_string(), "Offline".to_string()];
        row.resize(TABLE_HEADER.len(), NOT_AVAILABLE.to_string());
        return row;
    }

    let disk = match (node.disk_allocated, node.disk_used_percent) {
        (Some(allocated), Some(percent)) => {
            format!("{} / {:.2}%", format_bytes(allocated, 1000), percent)
        }
        (Some(allocated), None) => format!("{} / {}", format_bytes(allocated, 1000), NOT_AVAILABLE),
        _ => NOT_AVAILABLE.to_string(),
    };

    vec![
        node.name.clone(),
        or_na(node.node_id.clone()),
        "Online".to_string(),
        or_na(node.uptime.map(format_duration)),
        or_na(node.age.map(format_duration)),
        or_na(node.version.clone()),
        or_na(node.up_to_date.map(|u| if u { "Yes" } else { "No" }.to_string())),
        disk,
        or_na(node.bandwidth_utilization.map(|b| format_bytes(b, 1000))),
        or_na(node.satellites.map(|s| s.to_string())),
        or_na(node.vetting_progress.map(|v| format!("{:.2}%", v))),
    ]
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format a byte count with two decimals, scaling by `power` (1000 or 1024).
pub fn format_bytes(size: u64, power: u64) -> String {
    const LABELS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

    let power = power as f64;
    let mut value = size as f64;
    let mut unit = 0;
    while value > power && unit < LABELS.len() - 1 {
        value /= power;
        unit += 1;
    }

    format!("{:.2} {}", value, LABELS[unit])
}

/// Format a duration as `{days}d {hours}h`.
pub fn format_duration(duration: Duration) -> String {
    let duration = duration.max(Duration::zero());
    format!("{}d {}h", duration.num_days(), duration.num_hours() % 24)
}
