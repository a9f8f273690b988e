use crate::PlotError;
use crate::labels::title_prefix;
use kodo_results::value::Value;

fn title_case(text: &str) -> String {
    let mut previous_alphabetic = false;
    text.chars()
        .map(|c| {
            let mapped: String = if previous_alphabetic {
                c.to_lowercase().collect()
            } else {
                c.to_uppercase().collect()
            };
            previous_alphabetic = c.is_alphabetic();
            mapped
        })
        .collect()
}

fn title_value(parameter: &str, value: &Value) -> String {
    match (parameter, value) {
        // Sizes are stored in bytes and shown in KB, rounded down.
        ("symbol_size", Value::Integer(size)) => format!(r"${}\ KB.$", size.div_euclid(1000)),
        ("symbol_size", Value::Float(size)) => {
            format!(r"${}\ KB.$", Value::Float(size / 1000.))
        }
        ("loss_rate", Value::Integer(_) | Value::Float(_)) => {
            let percent = value.as_f64().unwrap_or_default() * 100.;
            format!(r"${}\%.$", percent.trunc() as i64)
        }
        ("type", Value::Text(device)) => format!("${}.$", title_case(device)),
        _ => format!("${}.$", value),
    }
}

/**
Title of the plot for one group, e.g. `$\ Packet\ size\colon\ 32\ KB.\ Device\colon\ Encoder.$`.

Each parameter contributes its prefix and its formatted value, adjacent math segments are merged.
*/
pub fn plot_title<S: AsRef<str>>(parameters: &[S], keys: &[Value]) -> Result<String, PlotError> {
    let mut title = String::new();
    for (parameter, value) in parameters.iter().zip(keys) {
        let parameter = parameter.as_ref();
        let prefix =
            title_prefix(parameter).ok_or_else(|| PlotError::UnknownParameter(parameter.into()))?;
        title.push_str(prefix);
        title.push_str(&title_value(parameter, value));
    }
    Ok(title.replace("$$", ""))
}

/// `<density>_<metric>_<varying>[_<fixed>_<key>]*.pdf`
pub fn plot_filename<S: AsRef<str>>(
    metric: &str,
    varying: &str,
    fixed: &[S],
    keys: &[Value],
    density: &str,
) -> String {
    let fixed_values: String = fixed
        .iter()
        .zip(keys)
        .map(|(parameter, value)| format!("_{}_{}", parameter.as_ref(), value))
        .collect();
    format!("{}_{}_{}{}.pdf", density, metric, varying, fixed_values)
}

/// Replaces anything but ASCII alphanumerics, `-`, `_` and `.` so that `text` is usable as a file
/// name and as a LaTeX jobname.
pub fn path_component(text: &str) -> String {
    let component: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match component.as_str() {
        "" | "." | ".." => component.replace('.', "_") + "_",
        _ => component,
    }
}

/// Name of the document gathering every group of one plot.
pub fn all_figures_filename(metric: &str, varying: &str, density: &str) -> String {
    format!("all_{}_{}_vs_{}.pdf", density, metric, varying)
}
