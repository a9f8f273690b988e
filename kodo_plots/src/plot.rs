use crate::figure::{Figure, group_picture};
use crate::labels;
use crate::naming::{all_figures_filename, plot_filename, plot_title};
use crate::output::{OutputOptions, jobname};
use crate::PlotError;
use kodo_results::dataset::ResultSet;
use kodo_results::grouping::group_by;
use kodo_results::pivot::pivot_table;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// What to plot: `metric` against `varying`, one figure per combination of `fixed` values and one
/// series per combination of `cases` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    pub metric: String,
    pub varying: String,
    pub fixed: Vec<String>,
    pub cases: Vec<String>,
    /// Density class label, prefixed to every file name.
    pub density: String,
}

impl PlotSpec {
    pub fn new(
        metric: &str,
        varying: &str,
        fixed: &[&str],
        cases: &[&str],
        density: &str,
    ) -> Self {
        Self {
            metric: metric.to_string(),
            varying: varying.to_string(),
            fixed: fixed.iter().map(|s| s.to_string()).collect(),
            cases: cases.iter().map(|s| s.to_string()).collect(),
            density: density.to_string(),
        }
    }

    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = vec![self.metric.as_str(), self.varying.as_str()];
        columns.extend(self.fixed.iter().map(String::as_str));
        columns.extend(self.cases.iter().map(String::as_str));
        columns
    }
}

/**
Renders one figure per group of `set` and a document gathering all of them.

Returns every file written. A failed compilation of the gathering document is only logged.
*/
pub fn plot_metric(
    set: &ResultSet,
    spec: &PlotSpec,
    output: &OutputOptions,
) -> Result<Vec<PathBuf>, PlotError> {
    if set.is_empty() {
        warn!(
            "[{}] No data for {} vs {}",
            spec.density, spec.metric, spec.varying
        );
        return Ok(Vec::new());
    }
    set.require_columns(&spec.required_columns())?;

    let kind = labels::plot_kind(&spec.metric, &spec.varying)?;
    let scale = labels::x_scale(&spec.metric, &spec.varying)?;
    let x_label = labels::x_label(&spec.varying)?;
    let y_label = labels::y_label(&spec.metric)?;

    let groups = group_by(set, &spec.fixed)?;
    info!(
        "[{}] {} vs {}: {} groups",
        spec.density,
        spec.metric,
        spec.varying,
        groups.len()
    );

    let mut written = Vec::new();
    let mut axes = Vec::with_capacity(groups.len());
    for (key, group) in &groups {
        debug!("[{}] {}: {} rows", spec.density, key, group.len());
        let table = pivot_table(group, &spec.metric, &spec.varying, &spec.cases)?;
        let figure = Figure {
            title: plot_title(&spec.fixed, key.values())?,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind,
            scale,
            ticks: table
                .index
                .iter()
                .map(|v| labels::tick_label(&spec.varying, v, kind))
                .collect(),
            legend: table.columns.iter().map(labels::legend_label).collect(),
            table: &table,
        };

        let filename = plot_filename(
            &spec.metric,
            &spec.varying,
            &spec.fixed,
            key.values(),
            &spec.density,
        );
        written.extend(output.write_picture(&figure.picture(), jobname(&filename))?);
        axes.push(figure.axis());
    }

    if !axes.is_empty() {
        let all = all_figures_filename(&spec.metric, &spec.varying, &spec.density);
        let picture = group_picture(&labels::escape(jobname(&all)), axes);
        match output.write_picture(&picture, jobname(&all)) {
            Ok(files) => written.extend(files),
            Err(PlotError::Compile { jobname, message }) => {
                error!("Failed to create PDF: {}, {}", jobname, message);
                written.push(output.directory.join(format!("{}.tex", jobname)));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(written)
}
