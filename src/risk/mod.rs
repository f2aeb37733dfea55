//! Risk calculators: cardiovascular (Framingham), diabetes (FINDRISC) and
//! metabolic syndrome.
//!
//! Every calculator is a pure function of its input and the reference tables.
//! `calculate_*` takes a typed input record; `assess_*` validates a raw
//! `HealthProfile` first and maps it onto that record.

mod assess;
mod cardiovascular;
mod diabetes;
mod messages;
mod metabolic;
mod types;

pub use assess::{assess, required_fields};
pub use cardiovascular::*;
pub use diabetes::*;
pub use messages::Advice;
pub use metabolic::*;
pub use types::*;
