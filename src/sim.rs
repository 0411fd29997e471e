//! Simulator invocation through the vendor flow scripts in `scripts/`.

use crate::Result;
use crate::layout::SimLayout;
use anyhow::{Context, bail};
use std::process::Command;

pub const DEFAULT_SCRIPT: &str = "simulate.sh";

/// The HBM testbench only builds under Questasim.
pub const SIMULATOR: &str = "questasim";

#[derive(Debug, Clone)]
pub struct SimRequest {
    pub testcase: String,
    pub top_module: String,
    pub gui: bool,
}

impl SimRequest {
    pub fn hbm(testcase: &str, top_module: &str, gui: bool) -> Self {
        Self {
            testcase: testcase.to_string(),
            top_module: top_module.to_string(),
            gui,
        }
    }

    /// `./<script> -top <top> -g on|off -t <tc> -s questasim`, run from `scripts/`.
    pub fn command(&self, layout: &SimLayout, script: &str) -> Command {
        let mut cmd = Command::new(format!("./{}", script));
        cmd.current_dir(layout.scripts_dir())
            .args(["-top", self.top_module.as_str()])
            .args(["-g", if self.gui { "on" } else { "off" }])
            .args(["-t", self.testcase.as_str()])
            .args(["-s", SIMULATOR]);
        cmd
    }

    pub fn run(&self, layout: &SimLayout, script: &str) -> Result<()> {
        let mut cmd = self.command(layout, script);
        log::info!("running HBM simulation: {}", command_line(&cmd));

        let status = cmd.status().with_context(|| {
            format!(
                "start {} in {}",
                script,
                layout.scripts_dir().display()
            )
        })?;

        match status.code() {
            Some(0) => {
                log::info!("HBM simulation finished: {}", self.testcase);
                Ok(())
            }
            Some(code) => bail!("HBM simulation of {} failed, exit code {}", self.testcase, code),
            None => bail!("HBM simulation of {} terminated by signal", self.testcase),
        }
    }
}

fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
