/*!
Figures of the Kodo benchmark results.

Result sets are grouped by their fixed parameters, pivoted into one series per case and
rendered through pgfplots, one standalone document per figure plus one group plot gathering all
the figures of a comparison.
*/

pub mod error;
pub mod figure;
pub mod labels;
pub mod logging;
pub mod naming;
pub mod output;
pub mod plot;
pub mod storage;
pub mod throughput;

pub use error::PlotError;
