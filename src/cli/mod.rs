//! Terminal front end: one module per command, sharing the table helpers in `ui`.

pub mod breakdown;
pub mod goals;
pub mod rate;
pub mod setup;
pub mod ui;
