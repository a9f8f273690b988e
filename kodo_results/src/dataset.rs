use crate::ResultsError;
use crate::value::Value;
use rmp_serde::{Deserializer, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/** One benchmark measurement, a row of a result table.

Typical columns are `testcase`, `type` (encoder/decoder), `symbols`, `symbol_size`, `loss_rate`,
`density`, `goodput` and `extra_symbols`.
*/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.fields.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An ordered collection of records, as loaded from one or more result files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    pub const EXTENSION: &'static str = "results.msgpack";
    pub const EXTENSION_ZSTD: &'static str = "results.msgpack.zst";

    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record)
    }

    /// Parses headed CSV data, each field becomes a [`Value`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ResultsError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let mut records: Vec<Record> = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(
                headers
                    .iter()
                    .zip(row.iter())
                    .map(|(column, field)| (column, Value::parse(field)))
                    .collect(),
            );
        }
        let mut set = Self { records };
        set.promote_integer_columns();
        Ok(set)
    }

    /// Reads a CSV file, `.zst` files are decompressed on the fly.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ResultsError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let set = if path.extension().is_some_and(|ext| ext == "zst") {
            Self::from_csv_reader(zstd::Decoder::new(file)?)?
        } else {
            Self::from_csv_reader(BufReader::new(file))?
        };
        debug!("Read {} rows from {}", set.len(), path.display());
        Ok(set)
    }

    /// Concatenates every file matching `pattern`, in path order.
    pub fn from_glob(pattern: &str) -> Result<Self, ResultsError> {
        let mut paths = Vec::new();
        for entry in glob::glob(pattern)? {
            paths.push(entry?);
        }
        paths.sort();
        if paths.is_empty() {
            warn!("No file matches {}", pattern);
        }
        let sets = paths
            .iter()
            .map(|path| Self::read_csv(path))
            .collect::<Result<Vec<_>, _>>()?;
        let set = Self::concat(sets);
        info!(
            "Loaded {} rows from {} files matching {}",
            set.len(),
            paths.len(),
            pattern
        );
        Ok(set)
    }

    /// Concatenates `sets`, columns mixing integers and reals end up real.
    pub fn concat(sets: impl IntoIterator<Item = ResultSet>) -> Self {
        let mut set = Self {
            records: sets.into_iter().flat_map(|s| s.records).collect(),
        };
        set.promote_integer_columns();
        set
    }

    /// Columns are typed as a whole: an integer column holding a real or an empty cell turns real.
    fn promote_integer_columns(&mut self) {
        let real: BTreeSet<String> = self
            .records
            .iter()
            .flat_map(Record::iter)
            .filter(|(_, v)| matches!(v, Value::Float(_) | Value::Missing))
            .map(|(c, _)| c.to_string())
            .collect();
        if real.is_empty() {
            return;
        }
        for record in &mut self.records {
            for column in &real {
                if let Some(value) = record.fields.get_mut(column) {
                    if let Value::Integer(i) = *value {
                        *value = Value::Float(i as f64);
                    }
                }
            }
        }
    }

    /// Sets `column` to `value` on every row, adding it where absent.
    pub fn set_column(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        for record in &mut self.records {
            record.insert(column, value.clone());
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        for record in &mut self.records {
            if let Some(value) = record.remove(from) {
                record.insert(to, value);
            }
        }
    }

    pub fn filter(&self, predicate: impl Fn(&Record) -> bool) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    pub fn filter_eq(&self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.filter(|r| r.get(column) == Some(&value))
    }

    /// Rows lacking `column` are kept.
    pub fn filter_ne(&self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.filter(|r| r.get(column) != Some(&value))
    }

    /// Sorted distinct values of `column`, rows lacking it are ignored.
    pub fn unique_values(&self, column: &str) -> Vec<Value> {
        let mut values: Vec<Value> = self
            .records
            .iter()
            .filter_map(|r| r.get(column).cloned())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /**
    Checks that each column is carried by at least one record, an empty set carries none.

    Records lacking a column read it as missing, like the rows of a concatenated table whose
    source file had no such column.
    */
    pub fn require_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<(), ResultsError> {
        for column in columns {
            let column = column.as_ref();
            if !self.records.iter().any(|r| r.contains(column)) {
                return Err(ResultsError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn read_msgpack(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        let buf = std::fs::read(path)?;
        let mut deserializer = Deserializer::new(&buf[..]);
        Ok(ResultSet::deserialize(&mut deserializer)?)
    }

    pub fn write_msgpack(&self, path: impl AsRef<Path>) -> Result<(), ResultsError> {
        let mut f = File::create(path)?;
        let mut s = Serializer::new(&mut f);
        self.serialize(&mut s)?;
        Ok(())
    }

    pub fn read_msgpack_zstd(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        let buf = std::fs::read(path)?;
        let mut decoder = zstd::Decoder::new(&buf[..])?;
        let mut deserializer = Deserializer::new(&mut decoder);
        Ok(ResultSet::deserialize(&mut deserializer)?)
    }

    pub fn write_msgpack_zstd(&self, path: impl AsRef<Path>) -> Result<(), ResultsError> {
        let f = File::create(path)?;
        let mut encoder = zstd::Encoder::new(f, 0)?;
        {
            let mut s = Serializer::new(&mut encoder);
            self.serialize(&mut s)?;
        }
        encoder.finish()?;
        Ok(())
    }

    /// Picks the archive format from the file name.
    pub fn read_archive(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "zst") {
            Self::read_msgpack_zstd(path)
        } else {
            Self::read_msgpack(path)
        }
    }

    pub fn write_archive(&self, path: impl AsRef<Path>) -> Result<(), ResultsError> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "zst") {
            self.write_msgpack_zstd(path)
        } else {
            self.write_msgpack(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, ResultSet};
    use crate::ResultsError;
    use crate::value::Value;
    use std::io::Write;

    const OPENFEC: &str = "testcase,type,symbols,symbol_size,loss_rate,goodput\n\
        OpenFEC,encoder,16,32000,0.05,120.5\n\
        OpenFEC,decoder,16,32000,0.05,98.25\n";

    const PERPETUAL: &str = "testcase,type,symbols,symbol_size,loss_rate,width_ratio,goodput\n\
        Perpetual,encoder,16,32000,0.05,0.375,80.0\n";

    fn write(dir: &std::path::Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn parses_csv_rows() {
        let set = ResultSet::from_csv_reader(OPENFEC.as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
        let first = &set.records()[0];
        assert_eq!(first.get("testcase"), Some(&Value::from("OpenFEC")));
        assert_eq!(first.get("symbol_size"), Some(&Value::Integer(32000)));
        assert_eq!(first.get("goodput"), Some(&Value::Float(120.5)));
    }

    #[test]
    fn glob_concatenates_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "openfec_debian6_a.csv", OPENFEC);
        write(dir.path(), "openfec_debian6_b.csv", OPENFEC);
        write(dir.path(), "perpetual_debian6.csv", PERPETUAL);

        let pattern = format!("{}/openfec_debian6*.csv", dir.path().display());
        let set = ResultSet::from_glob(&pattern).unwrap();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn empty_glob_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/isa_debian6*.csv", dir.path().display());
        let set = ResultSet::from_glob(&pattern).unwrap();
        assert!(set.is_empty());
        assert!(matches!(
            set.require_columns(&["goodput"]),
            Err(ResultsError::MissingColumn { .. })
        ));
    }

    #[test]
    fn reads_zstd_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isa_debian6.csv.zst");
        let compressed = zstd::encode_all(OPENFEC.as_bytes(), 0).unwrap();
        std::fs::write(&path, compressed).unwrap();
        let set = ResultSet::read_csv(&path).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn density_patches() {
        let mut openfec = ResultSet::from_csv_reader(OPENFEC.as_bytes()).unwrap();
        openfec.set_column("density", 1i64);
        assert!(
            openfec
                .records()
                .iter()
                .all(|r| r.get("density") == Some(&Value::Integer(1)))
        );

        let mut perpetual = ResultSet::from_csv_reader(PERPETUAL.as_bytes()).unwrap();
        perpetual.rename_column("width_ratio", "density");
        let record = &perpetual.records()[0];
        assert!(!record.contains("width_ratio"));
        assert_eq!(record.get("density"), Some(&Value::Float(0.375)));
    }

    #[test]
    fn filters_and_unique_values() {
        let set: ResultSet = ResultSet::new(vec![
            [("density", Value::Float(0.5)), ("symbols", Value::Integer(16))]
                .into_iter()
                .collect(),
            [("density", Value::Float(0.3)), ("symbols", Value::Integer(8))]
                .into_iter()
                .collect(),
            [("symbols", Value::Integer(8))].into_iter().collect::<Record>(),
        ]);
        assert_eq!(set.filter_eq("density", 0.5).len(), 1);
        assert_eq!(set.filter_ne("density", 0.5).len(), 2);
        assert_eq!(
            set.unique_values("symbols"),
            vec![Value::Integer(8), Value::Integer(16)]
        );
        assert!(set.require_columns(&["symbols"]).is_ok());
        // One row lacks it, the column still exists.
        assert!(set.require_columns(&["density"]).is_ok());
        assert!(matches!(
            set.require_columns(&["symbols", "goodput"]),
            Err(ResultsError::MissingColumn { column }) if column == "goodput"
        ));
    }

    #[test]
    fn integer_cells_follow_real_columns() {
        let csv = "testcase,density,loss_rate,symbols,extra_symbols\n\
            SparseFullRLNC,0.5,0,16,1\n\
            SparseFullRLNC,1,0.1,32,\n";
        let set = ResultSet::from_csv_reader(csv.as_bytes()).unwrap();
        let first = &set.records()[0];
        let second = &set.records()[1];
        assert!(matches!(second.get("density"), Some(Value::Float(_))));
        assert_eq!(second.get("density").unwrap().to_string(), "1.0");
        assert_eq!(first.get("loss_rate").unwrap().to_string(), "0.0");
        // An empty cell makes the whole column real.
        assert_eq!(first.get("extra_symbols").unwrap().to_string(), "1.0");
        assert!(matches!(first.get("symbols"), Some(Value::Integer(16))));

        let integers = ResultSet::from_csv_reader("symbols\n8\n".as_bytes()).unwrap();
        let reals = ResultSet::from_csv_reader("symbols\n0.5\n".as_bytes()).unwrap();
        let merged = ResultSet::concat([integers, reals]);
        assert_eq!(merged.records()[0].get("symbols").unwrap().to_string(), "8.0");
    }

    #[test]
    fn archive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let set = ResultSet::from_csv_reader(PERPETUAL.as_bytes()).unwrap();
        for name in ["all.results.msgpack", "all.results.msgpack.zst"] {
            let path = dir.path().join(name);
            set.write_archive(&path).unwrap();
            assert_eq!(ResultSet::read_archive(&path).unwrap(), set);
        }
    }
}
