//! Pure derivations over fetched samples: chart normalization, liveness,
//! rate conversion and window metrics. Nothing here performs I/O.

pub mod liveness;
pub mod metrics;
pub mod normalize;
pub mod rate;

pub use liveness::{DeviceSummary, FleetSummary, Liveness};
pub use metrics::{Thresholds, WindowMetrics};
pub use normalize::{NormalizedSeries, Normalizer};
