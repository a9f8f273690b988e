/*!
Nightly throughput plots of the Kodo codecs, one figure per build slave and code density.
*/

use crate::PlotError;
use crate::figure::Figure;
use crate::labels::{AxisScale, PlotKind, escape};
use crate::naming::path_component;
use crate::output::OutputOptions;
use kodo_results::dataset::ResultSet;
use kodo_results::grouping::group_by;
use kodo_results::nightly::{NightlyQuery, NightlyResult};
use kodo_results::pivot::pivot_table;
use std::path::PathBuf;
use tracing::{info, warn};

/// File name prefix and testcase of each plotted code.
pub const KINDS: [(&str, &str); 2] = [("dense", "FullDelayedRLNC"), ("sparse", "SparseDelayedRLNC")];

fn y_label(group: &ResultSet) -> String {
    let unit = group
        .records()
        .first()
        .and_then(|r| r.get("unit"))
        .map(|u| u.to_string())
        .unwrap_or_default();
    format!("Throughput [{}]", escape(&unit))
}

/**
Plots the mean throughput against the erasure rate for every (symbols, symbol_size) pair.

Figures land in `<output>/<coder>/<kind>_<slavename>`, both names reduced to file name safe characters.
*/
pub fn plot_nightly(
    results: &[NightlyResult],
    query: &NightlyQuery,
    output: &OutputOptions,
) -> Result<Vec<PathBuf>, PlotError> {
    let selected = query.select(results);
    info!(
        "{} of {} results match coder {} between {} and {}",
        selected.len(),
        results.len(),
        query.coder,
        query.from,
        query.until
    );
    if selected.is_empty() {
        warn!("Nothing to plot");
        return Ok(Vec::new());
    }

    let output = output.subdirectory(path_component(&query.coder));
    let mut written = Vec::new();
    for (kind, testcase) in KINDS {
        let subset = selected.filter_eq("testcase", testcase);
        for (key, group) in group_by(&subset, &["slavename"])? {
            let slavename = key.values()[0].to_string();
            let table = pivot_table(&group, "mean", "erasures", &["symbols", "symbol_size"])?;
            let figure = Figure {
                title: escape(&slavename),
                x_label: String::from("Erasures"),
                y_label: y_label(&group),
                kind: PlotKind::Line,
                scale: AxisScale::Linear,
                ticks: table.index.iter().map(|v| v.to_string()).collect(),
                legend: table.columns.iter().map(|c| c.to_string()).collect(),
                table: &table,
            };
            written.extend(
                output.write_picture(
                    &figure.picture(),
                    &format!("{}_{}", kind, path_component(&slavename)),
                )?,
            );
        }
    }
    Ok(written)
}
