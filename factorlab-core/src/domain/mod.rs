//! Domain types: observations, panels, factor-value series.

pub mod observation;
pub mod panel;
pub mod series;

pub use observation::Observation;
pub use panel::{JoinedPanel, RawPanel};
pub use series::{FactorRow, FactorSeries};
