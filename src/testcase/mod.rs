//! Test case discovery and JSON configuration handling.

pub mod config;
pub mod locate;

pub use config::{TestConfig, resolve_top_module};
pub use locate::{locate_config, validate_name};

/// Testbench top used by every HBM simulation.
pub const HBM_TOP: &str = "rn_tb_top_hbm";

/// Compute-logic testbench top.
pub const CL_TOP: &str = "cl_tb_top";
