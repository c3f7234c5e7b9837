//! Dashboard application state and its view models.

pub mod range;
pub mod state;
pub mod view;

pub use range::{ChartKind, ChartRange, HistorySource};
pub use state::{DashboardState, Event, FetchKind};
pub use view::{ApiStatus, ChartView, CurrentReading, MapDefaults, MapView, StatusKind, ViewContext};
