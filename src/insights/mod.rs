//! Reports built on top of the trend, anomaly, risk and score engines:
//! per-metric reports, wearable sleep and activity summaries, and the
//! concurrent dashboard.

mod activity;
mod dashboard;
mod metric;
mod sleep;

pub use activity::*;
pub use dashboard::*;
pub use metric::*;
pub use sleep::*;
