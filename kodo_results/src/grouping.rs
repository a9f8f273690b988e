use crate::ResultsError;
use crate::dataset::{Record, ResultSet};
use crate::reduce;
use crate::value::Value;
use std::fmt::{Display, Formatter};
use tracing::debug;

/**
Projection of a record onto a list of fixed parameters.

Keys order by their values, so groups come out in the same order a sorted group-by would give.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    values: Vec<Value>,
    parameters: Vec<String>,
}

impl GroupKey {
    pub fn new(parameters: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(parameters.len(), values.len());
        Self { values, parameters }
    }

    pub fn project<S: AsRef<str>>(record: &Record, parameters: &[S]) -> Self {
        Self {
            values: parameters
                .iter()
                .map(|p| record.get(p.as_ref()).cloned().unwrap_or(Value::Missing))
                .collect(),
            parameters: parameters.iter().map(|p| p.as_ref().to_string()).collect(),
        }
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, parameter: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .position(|p| p == parameter)
            .map(|i| &self.values[i])
    }

    /// A key with a missing value designates no group.
    pub fn is_complete(&self) -> bool {
        !self.values.iter().any(Value::is_missing)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.parameters
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (parameter, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={}", parameter, value)?;
        }
        Ok(())
    }
}

/// Partitions `set` by the values of `parameters`, groups sorted by key.
///
/// Records missing any of the parameters belong to no group.
pub fn group_by<S: AsRef<str> + Sync>(
    set: &ResultSet,
    parameters: &[S],
) -> Result<Vec<(GroupKey, ResultSet)>, ResultsError> {
    if set.is_empty() {
        return Ok(Vec::new());
    }
    set.require_columns(parameters)?;

    let rows: Vec<(GroupKey, &Record)> = set
        .records()
        .iter()
        .map(|record| (GroupKey::project(record, parameters), record))
        .filter(|(key, _)| key.is_complete())
        .collect();
    let mapped = reduce(
        rows,
        |(key, _record)| key.clone(),
        Vec::new,
        |acc: &mut Vec<Record>, (_key, record), _rk| acc.push(record.clone()),
        |acc, _rk| ResultSet::new(acc),
    );

    let mut groups: Vec<(GroupKey, ResultSet)> = mapped.into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    debug!("Found {} groups", groups.len());
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::{GroupKey, group_by};
    use crate::ResultsError;
    use crate::dataset::ResultSet;
    use crate::value::Value;

    fn sample() -> ResultSet {
        let csv = "testcase,type,symbols,symbol_size,loss_rate,goodput\n\
            FullRLNC,encoder,16,64000,0.1,10\n\
            FullRLNC,decoder,16,32000,0.1,11\n\
            ISA,encoder,32,32000,0.1,12\n\
            ISA,encoder,16,32000,0.05,13\n\
            Jerasure,encoder,64,32000,0.1,14\n";
        ResultSet::from_csv_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn groups_are_sorted_by_key() {
        let groups = group_by(&sample(), &["symbol_size", "loss_rate", "type"]).unwrap();
        let keys: Vec<String> = groups.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "symbol_size=32000, loss_rate=0.05, type=encoder",
                "symbol_size=32000, loss_rate=0.1, type=decoder",
                "symbol_size=32000, loss_rate=0.1, type=encoder",
                "symbol_size=64000, loss_rate=0.1, type=encoder",
            ]
        );
        let (_, encoders) = &groups[2];
        let symbols: Vec<&Value> = encoders
            .records()
            .iter()
            .map(|r| r.get("symbols").unwrap())
            .collect();
        assert_eq!(symbols, vec![&Value::Integer(32), &Value::Integer(64)]);
    }

    #[test]
    fn key_lookup() {
        let groups = group_by(&sample(), &["type"]).unwrap();
        assert_eq!(groups.len(), 2);
        let (key, group) = &groups[1];
        assert_eq!(key.get("type"), Some(&Value::from("encoder")));
        assert_eq!(key.get("symbols"), None);
        assert_eq!(group.len(), 4);
    }

    #[test]
    fn missing_grouping_column() {
        assert!(matches!(
            group_by(&sample(), &["density"]),
            Err(ResultsError::MissingColumn { column }) if column == "density"
        ));
    }

    #[test]
    fn rows_without_key_are_dropped() {
        let csv = "symbol_size,type,goodput\n\
            32000,encoder,10\n\
            ,encoder,11\n\
            32000,,12\n";
        let set = ResultSet::from_csv_reader(csv.as_bytes()).unwrap();
        let groups = group_by(&set, &["symbol_size"]).unwrap();
        let keys: Vec<String> = groups.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["symbol_size=32000.0"]);
        assert_eq!(groups[0].1.len(), 2);

        let groups = group_by(&set, &["symbol_size", "type"]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1.len(), 1);
    }

    #[test]
    fn empty_set_has_no_groups() {
        assert!(group_by(&ResultSet::default(), &["type"]).unwrap().is_empty());
    }

    #[test]
    fn projection_ignores_other_columns() {
        let set = sample();
        let a = GroupKey::project(&set.records()[1], &["symbols", "loss_rate"]);
        let b = GroupKey::project(&set.records()[4], &["symbols", "loss_rate"]);
        let c = GroupKey::project(&set.records()[0], &["symbols", "loss_rate"]);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
