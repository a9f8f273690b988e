use crate::ResultsError;
use crate::dataset::ResultSet;
use crate::value::Value;
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Values of the case columns identifying one plotted series, e.g. `(SparseFullRLNC, 0.3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseLabel(pub Vec<Value>);

impl Display for CaseLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            values => write!(f, "({})", values.iter().join(", ")),
        }
    }
}

/**
Mean of a metric for every (row value, case label) pair.

Rows and series that would hold no value at all are dropped, missing cells are `None`. Records
with a missing row value or case value are left out.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub metric: String,
    pub index: Vec<Value>,
    pub columns: Vec<CaseLabel>,
    /// `cells[column][row]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn series(&self) -> impl Iterator<Item = (&CaseLabel, &[Option<f64>])> {
        self.columns
            .iter()
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    pub fn get(&self, row: &Value, column: &CaseLabel) -> Option<f64> {
        let r = self.index.iter().position(|v| v == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        self.cells[c][r]
    }

    pub fn max(&self) -> Option<f64> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .copied()
            .reduce(f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }
}

pub fn pivot_table<S: AsRef<str> + Sync>(
    set: &ResultSet,
    metric: &str,
    rows: &str,
    cases: &[S],
) -> Result<PivotTable, ResultsError> {
    set.require_columns(&[metric, rows])?;
    set.require_columns(cases)?;

    let points: Vec<(Value, CaseLabel, f64)> = set
        .records()
        .par_iter()
        .filter_map(|record| {
            let y = record.get(metric)?.as_f64()?;
            let x = record.get(rows).filter(|x| !x.is_missing())?.clone();
            let label = cases
                .iter()
                .map(|c| record.get(c.as_ref()).filter(|v| !v.is_missing()).cloned())
                .collect::<Option<Vec<Value>>>()?;
            Some((x, CaseLabel(label), y))
        })
        .collect();

    let mut sums: HashMap<(Value, CaseLabel), (f64, usize)> = HashMap::new();
    for (x, label, y) in points {
        let entry = sums.entry((x, label)).or_insert((0.0, 0));
        entry.0 += y;
        entry.1 += 1;
    }

    let index: Vec<Value> = sums.keys().map(|(x, _)| x.clone()).sorted().dedup().collect();
    let columns: Vec<CaseLabel> = sums
        .keys()
        .map(|(_, l)| l.clone())
        .sorted()
        .dedup()
        .collect();

    let cells = columns
        .iter()
        .map(|label| {
            index
                .iter()
                .map(|x| {
                    sums.get(&(x.clone(), label.clone()))
                        .map(|(sum, count)| sum / *count as f64)
                })
                .collect()
        })
        .collect();

    Ok(PivotTable {
        metric: metric.to_string(),
        index,
        columns,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::{CaseLabel, pivot_table};
    use crate::dataset::ResultSet;
    use crate::value::Value;

    fn sample() -> ResultSet {
        let csv = "testcase,density,symbols,goodput\n\
            SparseFullRLNC,0.3,16,10\n\
            SparseFullRLNC,0.3,16,20\n\
            SparseFullRLNC,0.3,32,30\n\
            OpenFEC,1,32,40\n\
            OpenFEC,1,64,\n";
        ResultSet::from_csv_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn averages_duplicate_cells() {
        let table = pivot_table(&sample(), "goodput", "symbols", &["testcase", "density"]).unwrap();
        assert_eq!(table.index, vec![Value::Integer(16), Value::Integer(32)]);
        let labels: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels, vec!["(OpenFEC, 1.0)", "(SparseFullRLNC, 0.3)"]);

        let sparse = CaseLabel(vec![Value::from("SparseFullRLNC"), Value::Float(0.3)]);
        assert_eq!(table.get(&Value::Integer(16), &sparse), Some(15.0));
        assert_eq!(table.get(&Value::Integer(32), &sparse), Some(30.0));
        assert_eq!(table.cells[0], vec![None, Some(40.0)]);
        assert_eq!(table.max(), Some(40.0));
    }

    #[test]
    fn single_case_column_label() {
        let table = pivot_table(&sample(), "goodput", "symbols", &["testcase"]).unwrap();
        assert_eq!(table.columns[1].to_string(), "SparseFullRLNC");
    }

    #[test]
    fn patched_density_label() {
        let mut set = sample().filter_eq("testcase", "OpenFEC");
        set.set_column("density", Value::Float(1.0));
        let table = pivot_table(&set, "goodput", "symbols", &["testcase", "density"]).unwrap();
        assert_eq!(table.columns[0].to_string(), "(OpenFEC, 1.0)");
    }

    #[test]
    fn missing_keys_are_left_out() {
        let csv = "testcase,density,symbols,goodput\n\
            SparseFullRLNC,0.3,16,10\n\
            SparseFullRLNC,0.3,,20\n\
            SparseFullRLNC,,16,30\n\
            ,0.3,16,40\n";
        let set = ResultSet::from_csv_reader(csv.as_bytes()).unwrap();
        let table = pivot_table(&set, "goodput", "symbols", &["testcase", "density"]).unwrap();
        assert_eq!(table.index.len(), 1);
        assert_eq!(table.index[0].to_string(), "16.0");
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].to_string(), "(SparseFullRLNC, 0.3)");
        assert_eq!(table.cells, vec![vec![Some(10.0)]]);
    }

    #[test]
    fn absent_metric_cells_are_skipped() {
        let openfec = ResultSet::from_csv_reader(
            "testcase,type,symbols,goodput\nOpenFEC,decoder,16,90\n".as_bytes(),
        )
        .unwrap();
        let sparse = ResultSet::from_csv_reader(
            "testcase,type,symbols,goodput,extra_symbols\nSparseFullRLNC,decoder,16,60,1\n"
                .as_bytes(),
        )
        .unwrap();
        let set = ResultSet::concat([openfec, sparse]);
        let table = pivot_table(&set, "extra_symbols", "symbols", &["testcase"]).unwrap();
        let labels: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels, vec!["SparseFullRLNC"]);
        assert_eq!(table.cells, vec![vec![Some(1.0)]]);
    }

    #[test]
    fn missing_metric_column() {
        assert!(pivot_table(&sample(), "extra_symbols", "symbols", &["testcase"]).is_err());
    }
}
