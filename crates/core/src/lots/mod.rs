//! Lots module - FIFO cost-basis lot matching.

mod lots_model;
mod matcher;


pub use lots_model::{Lot, RealizedEvent, Replay};
pub use matcher::replay;
