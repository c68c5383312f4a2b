pub mod generate;
pub mod lookups;
pub mod moves;

pub use generate::{Evasions, QSearch, QSearchChecks, Quiets, Tacticals};
