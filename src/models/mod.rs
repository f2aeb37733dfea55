pub mod enums;
mod profile;
mod series;

pub use enums::*;
pub use profile::*;
pub use series::*;
