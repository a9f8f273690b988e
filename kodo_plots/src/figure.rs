use crate::labels::{self, AxisScale, PlotKind};
use itertools::Itertools;
use kodo_results::pivot::PivotTable;
use pgfplots::Picture;
use pgfplots::axis::plot::coordinate::Coordinate2D;
use pgfplots::axis::plot::{Plot2D, PlotKey};
use pgfplots::axis::{Axis, AxisKey};
use pgfplots::groupplot::{GroupDimension, GroupPlot};

/// Figures per row of the all-figures document.
pub const GROUP_COLUMNS: usize = 2;

const AXIS_SIZE: &str = "width=12cm, height=8cm";

/// One comparison plot: every case series of a pivot table against the varying parameter.
pub struct Figure<'a> {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: PlotKind,
    pub scale: AxisScale,
    /// One label per row of the table index.
    pub ticks: Vec<String>,
    /// One legend entry per series of the table.
    pub legend: Vec<String>,
    pub table: &'a PivotTable,
}

/// Wraps each item in braces so that commas inside labels survive pgfkeys list parsing.
fn braced_list(items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    items
        .into_iter()
        .map(|item| format!("{{{}}}", item.as_ref()))
        .join(",")
}

impl<'a> Figure<'a> {
    fn positions(&self) -> Vec<f64> {
        match self.kind {
            PlotKind::Line => self
                .table
                .index
                .iter()
                .enumerate()
                .map(|(i, v)| v.as_f64().unwrap_or(i as f64))
                .collect(),
            PlotKind::Bar => (0..self.table.index.len()).map(|i| i as f64).collect(),
        }
    }

    pub fn axis(&self) -> Axis {
        let positions = self.positions();
        let mut axis = Axis::new();
        axis.set_title(self.title.as_str());
        axis.add_key(AxisKey::Custom(AXIS_SIZE.to_string()));
        axis.add_key(AxisKey::Custom(format!("xlabel={{{}}}", self.x_label)));
        axis.add_key(AxisKey::Custom(format!("ylabel={{{}}}", self.y_label)));
        axis.add_key(AxisKey::Custom(String::from("grid=major")));
        if let AxisScale::Log { base } = self.scale {
            axis.add_key(AxisKey::Custom(format!("xmode=log, log basis x={}", base)));
        }
        axis.add_key(AxisKey::Custom(format!(
            "xtick={{{}}}",
            positions.iter().join(",")
        )));
        axis.add_key(AxisKey::Custom(format!(
            "xticklabels={{{}}}",
            braced_list(&self.ticks)
        )));
        if self.kind == PlotKind::Bar {
            axis.add_key(AxisKey::Custom(String::from(
                "ybar, ymin=0, enlarge x limits=0.15, area legend",
            )));
        }
        axis.add_key(AxisKey::Custom(format!(
            "legend entries={{{}}}",
            braced_list(&self.legend)
        )));
        axis.add_key(AxisKey::Custom(String::from(
            r"legend style={at={(1.03,0.5)}, anchor=west, font=\small}, legend cell align=left",
        )));

        for (series, (_label, cells)) in self.table.series().enumerate() {
            let mut plot = Plot2D::new();
            plot.coordinates = positions
                .iter()
                .zip(cells)
                .filter_map(|(x, y)| y.map(|y| Coordinate2D::from((*x, y))))
                .collect();
            let color = labels::color(series);
            let style = match self.kind {
                PlotKind::Line => format!("color={}, {}", color, labels::marker(series)),
                PlotKind::Bar => format!("draw={}, fill={}", color, color),
            };
            plot.add_key(PlotKey::Custom(style));
            axis.plots.push(plot);
        }
        axis
    }

    pub fn picture(&self) -> Picture {
        let mut picture = Picture::new();
        picture.axes.push(Box::new(self.axis()));
        picture.add_to_preamble(preamble());
        picture
    }
}

/// Colour definitions and font setup shared by every figure.
pub fn preamble() -> Vec<String> {
    let mut lines = vec![String::from(r"\renewcommand{\familydefault}{\sfdefault}")];
    lines.extend(
        labels::COLORS
            .iter()
            .map(|(name, html)| format!(r"\definecolor{{{}}}{{HTML}}{{{}}}", name, html)),
    );
    vec![lines.join("\n")]
}

/// Gathers the axes of several figures in one group plot.
pub fn group_picture(title: &str, axes: Vec<Axis>) -> Picture {
    let count = axes.len();
    let columns = count.clamp(1, GROUP_COLUMNS);
    let rows = count.div_ceil(columns).max(1);

    let mut group = GroupPlot::new();
    group.dimension = GroupDimension::Rectangle(columns as _, rows as _);
    for axis in axes {
        group.groups.push(axis);
    }
    group.set_title(title);
    group.add_key(AxisKey::Custom(String::from(
        "horizontal sep=7cm, vertical sep=3cm",
    )));

    let mut picture = Picture::new();
    picture.axes.push(Box::new(group));
    picture.add_to_preamble(preamble());
    picture
}

#[cfg(test)]
mod tests {
    use super::*;
    use kodo_results::dataset::ResultSet;
    use kodo_results::pivot::pivot_table;

    fn table() -> PivotTable {
        let csv = "testcase,density,symbols,goodput\n\
            SparseFullRLNC,0.3,16,10\n\
            SparseFullRLNC,0.3,32,30\n\
            OpenFEC,1.0,32,40\n";
        let set = ResultSet::from_csv_reader(csv.as_bytes()).unwrap();
        pivot_table(&set, "goodput", "symbols", &["testcase", "density"]).unwrap()
    }

    fn figure(table: &PivotTable, kind: PlotKind, scale: AxisScale) -> Figure<'_> {
        Figure {
            title: String::from(r"$\ Symbols\colon\ 16.$"),
            x_label: String::from(r"$Symbols$"),
            y_label: String::from(r"$Goodput\ [MB/s]$"),
            kind,
            scale,
            ticks: vec![String::from("$16$"), String::from("$32$")],
            legend: table.columns.iter().map(labels::legend_label).collect(),
            table,
        }
    }

    #[test]
    fn line_figure_source() {
        let table = table();
        let source = figure(&table, PlotKind::Line, AxisScale::Log { base: 2 })
            .picture()
            .standalone_string();
        assert!(source.contains("xmode=log, log basis x=2"));
        assert!(source.contains("xtick={16,32}"));
        assert!(source.contains("xticklabels={{$16$},{$32$}}"));
        assert!(source.contains(r"legend entries={{$OpenFEC-LDPC$},{$Kodo-Sparse\ RLNC,\ d =\ 0.3$}}"));
        assert!(source.contains("color=SteelBlue, mark=diamond*"));
        assert!(source.contains("color=DarkBlue, mark=+"));
        assert!(source.contains(r"\definecolor{Crimson}{HTML}{DC143C}"));
        assert!(!source.contains("ybar"));
    }

    #[test]
    fn bar_figure_source() {
        let table = table();
        let source = figure(&table, PlotKind::Bar, AxisScale::Linear)
            .picture()
            .standalone_string();
        assert!(source.contains("xtick={0,1}"));
        assert!(source.contains("ybar"));
        assert!(source.contains("draw=SteelBlue, fill=SteelBlue"));
        assert!(!source.contains("xmode=log"));
    }

    #[test]
    fn missing_cells_are_skipped() {
        let table = table();
        let axis = figure(&table, PlotKind::Line, AxisScale::Linear).axis();
        assert_eq!(axis.plots.len(), 2);
        assert_eq!(axis.plots[0].coordinates.len(), 1);
        assert_eq!(axis.plots[1].coordinates.len(), 2);
    }

    #[test]
    fn group_picture_source() {
        let table = table();
        let axes = vec![
            figure(&table, PlotKind::Line, AxisScale::Linear).axis(),
            figure(&table, PlotKind::Line, AxisScale::Linear).axis(),
            figure(&table, PlotKind::Line, AxisScale::Linear).axis(),
        ];
        let source = group_picture("all", axes).standalone_string();
        assert!(source.contains("groupplot"));
        assert!(source.contains("horizontal sep=7cm"));
    }
}
