//! Threshold evaluation over aggregated totals.
//!
//! Pure computation: no I/O happens here, which keeps the pass/fail
//! decision trivially testable against synthetic totals.

use crate::coverage::TargetTotals;

/// Tolerance for percentages reported to hundredths: a target within half
/// of the last printed digit of the threshold still passes.
pub const EPSILON: f64 = 0.005;

pub struct TargetRow {
    pub name: String,
    pub percent: f64,
    pub covered: u64,
    pub total: u64,
}

pub struct GateVerdict {
    pub rows: Vec<TargetRow>,
    pub failing: Vec<(String, f64)>,
}

impl GateVerdict {
    pub fn passed(&self) -> bool {
        self.failing.is_empty()
    }
}

pub fn evaluate(totals: &[TargetTotals], threshold: f64) -> GateVerdict {
    evaluate_with_epsilon(totals, threshold, EPSILON)
}

fn evaluate_with_epsilon(totals: &[TargetTotals], threshold: f64, epsilon: f64) -> GateVerdict {
    let mut rows = Vec::with_capacity(totals.len());
    let mut failing = Vec::new();
    for entry in totals {
        let percent = entry.totals.percent();
        rows.push(TargetRow {
            name: entry.name.clone(),
            percent,
            covered: entry.totals.covered,
            total: entry.totals.total,
        });
        if percent + epsilon < threshold {
            failing.push((entry.name.clone(), percent));
        }
    }
    GateVerdict { rows, failing }
}
