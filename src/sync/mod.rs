//! Causality tracking shared by documents and change records

mod clock;

pub use clock::{LamportClock, VectorClock};
