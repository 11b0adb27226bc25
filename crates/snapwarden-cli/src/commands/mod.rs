//! Command implementations.

pub mod config;
pub mod run;
pub mod status;
pub mod sweep;

pub use self::config::execute_config;
pub use self::run::execute_run;
pub use self::status::execute_status;
pub use self::sweep::execute_sweep;
