//! Command implementations.

mod run;
mod validate;

pub use run::run_sensor;
pub use validate::run_validate;
