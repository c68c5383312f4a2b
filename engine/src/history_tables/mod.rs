pub mod history;
pub mod killers;

pub use history::History;
pub use killers::{Killers, SearchStack};
