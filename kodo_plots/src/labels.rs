/*!
Display metadata for the storage benchmark plots.

Everything here is a static lookup keyed by raw column names or values. Labels are LaTeX math
strings, they end up verbatim in the pgfplots source.
*/

use crate::PlotError;
use kodo_results::pivot::CaseLabel;
use kodo_results::value::Value;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    Log { base: u32 },
}

pub fn x_label(varying: &str) -> Result<&'static str, PlotError> {
    match varying {
        "symbol_size" => Ok(r"$Symbol\ Size\ [KB]$"),
        "symbols" => Ok(r"$Symbols$"),
        "loss_rate" => Ok(r"$Loss\ Rate\ [\%]$"),
        "erased_symbols" => Ok(r"$Erased\ Symbols$"),
        _ => Err(PlotError::UnknownLabel {
            table: "x-axis label",
            key: varying.to_string(),
        }),
    }
}

pub fn y_label(metric: &str) -> Result<&'static str, PlotError> {
    match metric {
        "goodput" => Ok(r"$Goodput\ [MB/s]$"),
        "extra_symbols" => Ok(r"$Average\ Extra\ Symbols$"),
        _ => Err(PlotError::UnknownLabel {
            table: "y-axis label",
            key: metric.to_string(),
        }),
    }
}

pub fn title_prefix(parameter: &str) -> Option<&'static str> {
    match parameter {
        "symbol_size" => Some(r"$\ Packet\ size\colon\ $"),
        "symbols" => Some(r"$\ Symbols\colon\ $"),
        "loss_rate" => Some(r"$\ Loss\ rate\colon\ $"),
        "type" => Some(r"$\ Device\colon\ $"),
        _ => None,
    }
}

fn known_legend_label(case: &str) -> Option<&'static str> {
    match case {
        "(OpenFEC, 1.0)" => Some(r"$OpenFEC-LDPC$"),
        "(Perpetual, 0.2652)" => Some(r"$Kodo-Perpetual,\ w_r =\ 0.2652$"),
        "(Perpetual, 0.375)" => Some(r"$Kodo-Perpetual,\ w_r =\ 0.375$"),
        "(Perpetual, 0.5303)" => Some(r"$Kodo-Perpetual,\ w_r =\ 0.5303$"),
        "(SparseFullRLNC, 0.3)" => Some(r"$Kodo-Sparse\ RLNC,\ d =\ 0.3$"),
        "(SparseFullRLNC, 0.4)" => Some(r"$Kodo-Sparse\ RLNC,\ d =\ 0.4$"),
        "(SparseFullRLNC, 0.5)" => Some(r"$Kodo-Sparse\ RLNC,\ d =\ 0.5$"),
        "(SparseThread, 0.3)" => Some(r"$Kodo-Sparse\ Threading,\ d =\ 0.3$"),
        "(SparseThread, 0.4)" => Some(r"$Kodo-Sparse\ Threading,\ d =\ 0.4$"),
        "(SparseThread, 0.5)" => Some(r"$Kodo-Sparse\ Threading,\ d =\ 0.5$"),
        "(Thread, 1.0)" => Some(r"$Kodo-Threading\ RLNC$"),
        "(FullRLNC, 1.0)" => Some(r"$Kodo-Full\ RLNC$"),
        "(ISA, 1.0)" => Some(r"$ISA-RS$"),
        "(Jerasure, 1.0)" => Some(r"$Jerasure-RS$"),
        _ => None,
    }
}

/// Legend entry for a series, unknown cases are shown raw.
pub fn legend_label(case: &CaseLabel) -> String {
    let raw = case.to_string();
    match known_legend_label(&raw) {
        Some(label) => label.to_string(),
        None => {
            warn!("No legend label for {}, using it verbatim", raw);
            escape(&raw)
        }
    }
}

pub fn x_scale(metric: &str, varying: &str) -> Result<AxisScale, PlotError> {
    match (metric, varying) {
        ("goodput", "symbol_size") | ("goodput", "symbols") => Ok(AxisScale::Log { base: 2 }),
        ("goodput", "loss_rate") | ("goodput", "erased_symbols") | ("extra_symbols", "symbols") => {
            Ok(AxisScale::Linear)
        }
        _ => Err(PlotError::UnknownLabel {
            table: "x-axis scale",
            key: format!("({}, {})", metric, varying),
        }),
    }
}

pub fn plot_kind(metric: &str, varying: &str) -> Result<PlotKind, PlotError> {
    match (metric, varying) {
        ("goodput", "symbol_size") | ("goodput", "symbols") | ("goodput", "loss_rate") => {
            Ok(PlotKind::Line)
        }
        ("goodput", "erased_symbols") | ("extra_symbols", "symbols") => Ok(PlotKind::Bar),
        _ => Err(PlotError::UnknownLabel {
            table: "plot kind",
            key: format!("({}, {})", metric, varying),
        }),
    }
}

const SYMBOL_SIZE_TICKS: [(f64, &str); 6] = [
    (32000., "$32$"),
    (64000., "$64$"),
    (128000., "$128$"),
    (256000., "$256$"),
    (512000., "$512$"),
    (1024000., "$1024$"),
];

const SYMBOLS_TICKS: [(f64, &str); 7] = [
    (8., "$8$"),
    (16., "$16$"),
    (32., "$32$"),
    (64., "$64$"),
    (128., "$128$"),
    (256., "$256$"),
    (512., "$512$"),
];

const LOSS_RATE_TICKS: [(f64, &str); 6] = [
    (0.05, "$5$"),
    (0.1, "$10$"),
    (0.15, "$15$"),
    (0.2, "$20$"),
    (0.25, "$25$"),
    (0.3, "$30$"),
];

fn tick_table(varying: &str) -> &'static [(f64, &'static str)] {
    match varying {
        "symbol_size" => &SYMBOL_SIZE_TICKS,
        "symbols" => &SYMBOLS_TICKS,
        "loss_rate" => &LOSS_RATE_TICKS,
        _ => &[],
    }
}

/// Tick label of `value` on the `varying` axis, values outside the table print as `$value$`.
pub fn tick_label(varying: &str, value: &Value, kind: PlotKind) -> String {
    let known = value
        .as_f64()
        .and_then(|v| tick_table(varying).iter().find(|(k, _)| *k == v));
    match known {
        Some((_, label)) => label.to_string(),
        None => {
            if kind == PlotKind::Line {
                warn!("No tick label for {} = {}", varying, value);
            }
            format!("${}$", value)
        }
    }
}

/// Series colours, in cycle order: SteelBlue, DarkBlue, LimeGreen, DarkGreen, Crimson, DarkRed,
/// Brown, Black.
pub const COLORS: [(&str, &str); 8] = [
    ("SteelBlue", "4682B4"),
    ("DarkBlue", "00008B"),
    ("LimeGreen", "32CD32"),
    ("DarkGreen", "006400"),
    ("Crimson", "DC143C"),
    ("DarkRed", "8B0000"),
    ("Brown", "A52A2A"),
    ("Black", "000000"),
];

/// pgfplots marks for the `d + x ^ v s * h` marker cycle.
pub const MARKERS: [&str; 8] = [
    "mark=diamond*",
    "mark=+",
    "mark=x",
    "mark=triangle*",
    "mark=triangle*, mark options={rotate=180}",
    "mark=square*",
    "mark=asterisk",
    "mark=pentagon*",
];

pub fn color(series: usize) -> &'static str {
    COLORS[series % COLORS.len()].0
}

pub fn marker(series: usize) -> &'static str {
    MARKERS[series % MARKERS.len()]
}

/// Escapes text for use outside math mode.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '%' | '&' | '#' | '$' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
