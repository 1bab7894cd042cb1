//! CLI command implementations.
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `run`    | `Run`            |
//! | `report` | `Report`         |
//! | `config` | `Config`         |

pub mod config;
pub mod report;
pub mod run;

pub use config::cmd_config;
pub use report::cmd_report;
pub use run::{RunOptions, cmd_run};
