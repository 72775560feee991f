//! Grid warmer service library.

pub mod warmer;

pub use warmer::{GridWarmer, WarmReport, WarmedGrid};
