/*!
Storage benchmark plots: goodput and linear dependency of the erasure and network codes.

The benchmarks of each codec family write `<family>_<platform>*.csv` files. Families are patched
so that every row carries a `density` column, then split between sparse and dense codes.
*/

use crate::PlotError;
use crate::output::OutputOptions;
use crate::plot::{PlotSpec, plot_metric};
use kodo_results::dataset::ResultSet;
use kodo_results::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column tagging each row of an archive with the family it was read from.
pub const SOURCE_COLUMN: &str = "source";

/// Sparse RLNC at this density is compared with the dense codes.
pub const DENSE_SPARSE_DENSITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    OpenFec,
    Jerasure,
    Isa,
    FullRlnc,
    Sparse,
    Perpetual,
    ThreadRlnc,
    SparseThread,
}

impl Family {
    pub const ALL: [Family; 8] = [
        Family::OpenFec,
        Family::Jerasure,
        Family::Isa,
        Family::FullRlnc,
        Family::Sparse,
        Family::Perpetual,
        Family::ThreadRlnc,
        Family::SparseThread,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Family::OpenFec => "openfec",
            Family::Jerasure => "jerasure",
            Family::Isa => "isa",
            Family::FullRlnc => "fullrlnc",
            Family::Sparse => "sparse",
            Family::Perpetual => "perpetual",
            Family::ThreadRlnc => "thread_rlnc",
            Family::SparseThread => "sparse_thread",
        }
    }

    /// Brings the family's columns in line with the others.
    pub fn patch(&self, set: &mut ResultSet) {
        match self {
            // Non sparse codes have all coefficients non zero.
            Family::OpenFec
            | Family::Isa
            | Family::Jerasure
            | Family::FullRlnc
            | Family::ThreadRlnc => set.set_column("density", Value::Float(1.0)),
            // The width ratio of perpetual codes plays the role of a density.
            Family::Perpetual => set.rename_column("width_ratio", "density"),
            Family::Sparse | Family::SparseThread => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Sparse,
    Dense,
    /// Sparse codes, decoder rows only.
    LinearDependency,
}

impl DatasetKind {
    pub fn density_label(&self) -> &'static str {
        match self {
            DatasetKind::Sparse | DatasetKind::LinearDependency => "sparse",
            DatasetKind::Dense => "dense",
        }
    }
}

/// Raw results of every family, before patching.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    sets: BTreeMap<Family, ResultSet>,
}

impl Sources {
    pub fn pattern(input_dir: &Path, family: Family, platform: &str) -> String {
        input_dir
            .join(format!("{}_{}*.csv", family.prefix(), platform))
            .to_string_lossy()
            .into_owned()
    }

    pub fn from_csv(input_dir: &Path, platform: &str) -> Result<Self, PlotError> {
        let mut sets = BTreeMap::new();
        for family in Family::ALL {
            let set = ResultSet::from_glob(&Self::pattern(input_dir, family, platform))?;
            sets.insert(family, set);
        }
        Ok(Self { sets })
    }

    /// Splits an archive written by [`Sources::to_archive`].
    pub fn from_archive(archive: &ResultSet) -> Self {
        let mut sets = BTreeMap::new();
        for family in Family::ALL {
            let set = archive.filter_eq(SOURCE_COLUMN, family.prefix());
            sets.insert(family, strip_source(set));
        }
        Self { sets }
    }

    /// Concatenates every family, each row tagged with its family.
    pub fn to_archive(&self) -> ResultSet {
        ResultSet::concat(self.sets.iter().map(|(family, set)| {
            let mut set = set.clone();
            set.set_column(SOURCE_COLUMN, family.prefix());
            set
        }))
    }

    pub fn get(&self, family: Family) -> ResultSet {
        self.sets.get(&family).cloned().unwrap_or_default()
    }

    pub fn total_rows(&self) -> usize {
        self.sets.values().map(ResultSet::len).sum()
    }

    fn patched(&self, family: Family) -> ResultSet {
        let mut set = self.get(family);
        family.patch(&mut set);
        set
    }
}

fn strip_source(set: ResultSet) -> ResultSet {
    ResultSet::new(
        set.into_records()
            .into_iter()
            .map(|mut r| {
                r.remove(SOURCE_COLUMN);
                r
            })
            .collect(),
    )
}

/// The comparison datasets built from the patched families.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub sparse: ResultSet,
    pub dense: ResultSet,
    pub linear_dependency: ResultSet,
}

impl Datasets {
    pub fn build(sources: &Sources) -> Self {
        let sparse_rlnc = sources.patched(Family::Sparse);
        let sparse_thread = sources.patched(Family::SparseThread);

        let sparse = ResultSet::concat([
            sources.patched(Family::OpenFec),
            sources.patched(Family::Perpetual),
            sparse_thread.filter_ne("density", DENSE_SPARSE_DENSITY),
            sparse_rlnc.filter_ne("density", DENSE_SPARSE_DENSITY),
        ]);

        let dense = ResultSet::concat([
            sources.patched(Family::Isa),
            sources.patched(Family::Jerasure),
            sources.patched(Family::FullRlnc),
            sources.patched(Family::ThreadRlnc),
            sparse_rlnc.filter_eq("density", DENSE_SPARSE_DENSITY),
            sparse_thread.filter_eq("density", DENSE_SPARSE_DENSITY),
        ]);

        let linear_dependency = sparse.filter_eq("type", "decoder");

        info!(
            "Datasets: {} sparse rows, {} dense rows, {} decoder rows",
            sparse.len(),
            dense.len(),
            linear_dependency.len()
        );
        Self {
            sparse,
            dense,
            linear_dependency,
        }
    }

    pub fn get(&self, kind: DatasetKind) -> &ResultSet {
        match kind {
            DatasetKind::Sparse => &self.sparse,
            DatasetKind::Dense => &self.dense,
            DatasetKind::LinearDependency => &self.linear_dependency,
        }
    }
}

/// One entry of the plot list, rendered once per dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotEntry {
    pub metric: String,
    pub varying: String,
    pub fixed: Vec<String>,
    #[serde(default = "default_cases")]
    pub cases: Vec<String>,
    pub datasets: Vec<DatasetKind>,
}

fn default_cases() -> Vec<String> {
    vec![String::from("testcase"), String::from("density")]
}

impl PlotEntry {
    fn new(metric: &str, varying: &str, fixed: &[&str], datasets: &[DatasetKind]) -> Self {
        Self {
            metric: metric.to_string(),
            varying: varying.to_string(),
            fixed: fixed.iter().map(|s| s.to_string()).collect(),
            cases: default_cases(),
            datasets: datasets.to_vec(),
        }
    }

    pub fn spec(&self, kind: DatasetKind) -> PlotSpec {
        PlotSpec {
            metric: self.metric.clone(),
            varying: self.varying.clone(),
            fixed: self.fixed.clone(),
            cases: self.cases.clone(),
            density: kind.density_label().to_string(),
        }
    }
}

pub fn default_plots() -> Vec<PlotEntry> {
    use DatasetKind::*;
    vec![
        PlotEntry::new(
            "goodput",
            "symbols",
            &["symbol_size", "loss_rate", "type"],
            &[Sparse, Dense],
        ),
        PlotEntry::new(
            "goodput",
            "symbol_size",
            &["symbols", "loss_rate", "type"],
            &[Sparse, Dense],
        ),
        PlotEntry::new(
            "goodput",
            "loss_rate",
            &["symbol_size", "symbols", "type"],
            &[Sparse, Dense],
        ),
        PlotEntry::new(
            "goodput",
            "erased_symbols",
            &["symbol_size", "symbols", "type"],
            &[Sparse, Dense],
        ),
        PlotEntry::new(
            "extra_symbols",
            "symbols",
            &["symbol_size", "loss_rate"],
            &[LinearDependency],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub platform: String,
    pub input_dir: PathBuf,
    pub plots: Vec<PlotEntry>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            platform: String::from("debian6"),
            input_dir: PathBuf::from("."),
            plots: default_plots(),
        }
    }
}

impl StorageConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlotError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| PlotError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Writes the archive of `sources` to `dest`, which must not exist yet.
pub fn merge_into(dest: &Path, sources: &Sources) -> Result<(), PlotError> {
    if dest.exists() {
        return Err(PlotError::DestinationExists(dest.to_path_buf()));
    }
    info!(
        "Merging {} results into {}",
        sources.total_rows(),
        dest.display()
    );
    sources.to_archive().write_archive(dest)?;
    Ok(())
}

/// Renders every entry of the plot list, returns the files written.
pub fn plot_storage(
    config: &StorageConfig,
    sources: &Sources,
    output: &OutputOptions,
) -> Result<Vec<PathBuf>, PlotError> {
    let datasets = Datasets::build(sources);
    let mut written = Vec::new();
    for entry in &config.plots {
        for kind in &entry.datasets {
            written.extend(plot_metric(datasets.get(*kind), &entry.spec(*kind), output)?);
        }
    }
    info!("Wrote {} files", written.len());
    Ok(written)
}
