//! Output formatting

use anomaly_matrix::{AnomalyMatrix, MetricId, SegmentId};
use colored::*;
use tabled::{Table, Tabled};

/// Output format for the built matrix
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One row per cell, then per-metric totals
    #[default]
    Table,
    /// The matrix as JSON
    Json,
}

#[derive(Debug, Tabled)]
struct CellRow {
    segment_a: String,
    segment_b: String,
    metric: String,
    good: u32,
    bad: u32,
    net: i64,
}

/// Render the cell table in declared order, using display names.
pub fn cell_table(matrix: &AnomalyMatrix) -> String {
    let name_a = |id: &SegmentId| {
        matrix
            .segments_a()
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let name_b = |id: &SegmentId| {
        matrix
            .segments_b()
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let metric_name = |id: &MetricId| {
        matrix
            .metrics()
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let rows: Vec<CellRow> = matrix
        .cells()
        .iter()
        .map(|c| CellRow {
            segment_a: name_a(&c.segment_a),
            segment_b: name_b(&c.segment_b),
            metric: metric_name(&c.metric),
            good: c.good,
            bad: c.bad,
            net: c.net,
        })
        .collect();

    Table::new(rows).to_string()
}

fn colorize_net(net: i64) -> ColoredString {
    let text = format!("{:+}", net);
    match net.signum() {
        1 => text.green(),
        -1 => text.red(),
        _ => text.normal(),
    }
}

/// Print the matrix in the requested format
pub fn print_matrix(matrix: &AnomalyMatrix, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if matrix.is_empty() {
                println!("{}", "No cells".dimmed());
                return Ok(());
            }
            println!("{}", cell_table(matrix));
            println!();
            for metric in matrix.metrics() {
                let totals = matrix.totals_for_metric(&metric.id);
                println!(
                    "{:<24} good {:>5}  bad {:>5}  net {}",
                    metric.name.bold(),
                    totals.good,
                    totals.bad,
                    colorize_net(totals.net)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(matrix)?);
        }
    }
    Ok(())
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}
