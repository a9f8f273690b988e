/*!
Results of the nightly throughput benchmarks, as exported from the benchmark store.

Each document holds the raw throughput samples of one (testcase, symbols, symbol_size,
erasure_rate) configuration, measured on one build slave.
*/

use crate::ResultsError;
use crate::dataset::{Record, ResultSet};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub const DEFAULT_BRANCH: &str = "master";
pub const NIGHTLY_SCHEDULER: &str = "kodo-nightly-benchmark";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightlyResult {
    #[serde(rename = "type")]
    pub coder: String,
    pub branch: String,
    pub scheduler: String,
    #[serde(deserialize_with = "deserialize_utc_date")]
    pub utc_date: DateTime<Utc>,
    pub testcase: String,
    pub slavename: String,
    pub symbols: u64,
    pub symbol_size: u64,
    pub erasure_rate: f64,
    pub throughput: Vec<f64>,
    #[serde(default)]
    pub unit: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtendedDate {
    Text(DateTime<Utc>),
    Millis(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateField {
    Text(DateTime<Utc>),
    Extended {
        #[serde(rename = "$date")]
        date: ExtendedDate,
    },
}

/// Accepts both plain RFC 3339 strings and the `{"$date": ...}` extended JSON form.
fn deserialize_utc_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match DateField::deserialize(deserializer)? {
        DateField::Text(date)
        | DateField::Extended {
            date: ExtendedDate::Text(date),
        } => Ok(date),
        DateField::Extended {
            date: ExtendedDate::Millis(millis),
        } => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", millis))),
    }
}

impl NightlyResult {
    pub fn mean(&self) -> Option<f64> {
        mean(&self.throughput)
    }

    pub fn std(&self) -> Option<f64> {
        population_std(&self.throughput)
    }

    /// Flattens the document into a row with derived `mean`, `std` and `erasures` columns.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("type", self.coder.as_str());
        record.insert("branch", self.branch.as_str());
        record.insert("scheduler", self.scheduler.as_str());
        record.insert("utc_date", self.utc_date.to_rfc3339());
        record.insert("testcase", self.testcase.as_str());
        record.insert("slavename", self.slavename.as_str());
        record.insert("symbols", self.symbols);
        record.insert("symbol_size", self.symbol_size);
        record.insert("erasure_rate", self.erasure_rate);
        record.insert("erasures", self.erasure_rate);
        record.insert("unit", self.unit.as_str());
        for (column, value) in [("mean", self.mean()), ("std", self.std())] {
            match value {
                Some(v) => record.insert(column, v),
                None => record.insert(column, crate::value::Value::Missing),
            }
        }
        record
    }
}

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Standard deviation with zero delta degrees of freedom.
pub fn population_std(samples: &[f64]) -> Option<f64> {
    let m = mean(samples)?;
    let variance =
        samples.iter().map(|s| (s - m) * (s - m)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// Selects the results of one nightly run: one coder, one branch, one day.
#[derive(Debug, Clone, PartialEq)]
pub struct NightlyQuery {
    pub coder: String,
    pub branch: String,
    pub scheduler: String,
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl NightlyQuery {
    /// Results produced during the day before `date`.
    pub fn for_day(coder: impl Into<String>, date: NaiveDate) -> Self {
        let until = date.and_time(NaiveTime::MIN).and_utc();
        Self {
            coder: coder.into(),
            branch: DEFAULT_BRANCH.to_string(),
            scheduler: NIGHTLY_SCHEDULER.to_string(),
            from: until - Duration::days(1),
            until,
        }
    }

    pub fn matches(&self, result: &NightlyResult) -> bool {
        result.coder == self.coder
            && result.branch == self.branch
            && result.scheduler == self.scheduler
            && self.from <= result.utc_date
            && result.utc_date < self.until
    }

    pub fn select(&self, results: &[NightlyResult]) -> ResultSet {
        ResultSet::new(
            results
                .iter()
                .filter(|r| self.matches(r))
                .map(NightlyResult::to_record)
                .collect(),
        )
    }
}

pub fn parse_date(date: &str) -> Result<NaiveDate, ResultsError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ResultsError::InvalidDate(date.to_string()))
}

/// Reads a JSON array of result documents.
pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<NightlyResult>, ResultsError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ResultsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let results: Vec<NightlyResult> = serde_json::from_reader(BufReader::new(file))?;
    info!("Read {} results from {}", results.len(), path.display());
    Ok(results)
}
