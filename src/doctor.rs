//! `check` mode: inspect the simulation environment without running anything.

use crate::Result;
use crate::env::{COMPILED_LIB_DIR, VIVADO_DIR};
use crate::flow::REGRESSION_TESTCASES;
use crate::layout::{BLOCK_DESIGN, SimLayout};
use crate::pktgen::PacketGen;
use anyhow::bail;
use std::ffi::OsString;
use std::fmt;

/// IPs every HBM simulation build relies on.
pub const BASE_IPS: &[&str] = &["axi_mm_bram", "axi_sys_mm", "axi_protocol_checker"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Missing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::Warn => "warn",
            Status::Missing => "missing",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub name: String,
    pub status: Status,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub items: Vec<CheckItem>,
}

impl Report {
    fn push(&mut self, name: impl Into<String>, status: Status, detail: impl Into<String>) {
        self.items.push(CheckItem {
            name: name.into(),
            status,
            detail: detail.into(),
        });
    }

    fn require(&mut self, name: impl Into<String>, present: bool, detail: String) {
        let status = if present { Status::Ok } else { Status::Missing };
        self.push(name, status, detail);
    }

    pub fn missing(&self) -> impl Iterator<Item = &CheckItem> {
        self.items.iter().filter(|i| i.status == Status::Missing)
    }

    pub fn log(&self) {
        for item in &self.items {
            match item.status {
                Status::Ok => log::info!("[{}] {}: {}", item.status, item.name, item.detail),
                Status::Warn => log::warn!("[{}] {}: {}", item.status, item.name, item.detail),
                Status::Missing => log::error!("[{}] {}: {}", item.status, item.name, item.detail),
            }
        }
    }

    pub fn into_result(self) -> Result<()> {
        let missing: Vec<&str> = self.missing().map(|i| i.name.as_str()).collect();
        if !missing.is_empty() {
            bail!("environment check failed: {}", missing.join(", "));
        }
        log::info!("environment check passed");
        Ok(())
    }
}

pub fn check<F>(layout: &SimLayout, pktgen: &PacketGen, sim_script: &str, lookup: F) -> Report
where
    F: Fn(&str) -> Option<OsString>,
{
    let mut report = Report::default();
    log::debug!("checking simulation tree at {}", layout.root().display());

    match lookup(VIVADO_DIR).filter(|v| !v.is_empty()) {
        Some(v) => report.push(VIVADO_DIR, Status::Ok, v.to_string_lossy()),
        None => report.push(VIVADO_DIR, Status::Missing, "not set"),
    }
    match lookup(COMPILED_LIB_DIR).filter(|v| !v.is_empty()) {
        Some(v) => report.push(COMPILED_LIB_DIR, Status::Ok, v.to_string_lossy()),
        None => report.push(COMPILED_LIB_DIR, Status::Warn, "not set"),
    }

    for tc in REGRESSION_TESTCASES {
        let dir = layout.testcase_dir(tc);
        report.require(format!("testcase {}", tc), dir.is_dir(), dir.display().to_string());
    }

    // Optional with -no_pktgen / -no_sim, so only warn.
    let program = pktgen.program();
    let status = if program.is_file() { Status::Ok } else { Status::Warn };
    report.push("packet generator", status, program.display().to_string());
    let script = layout.scripts_dir().join(sim_script);
    let status = if script.is_file() { Status::Ok } else { Status::Warn };
    report.push("simulation script", status, script.display().to_string());

    let build = layout.build_dir();
    if !build.is_dir() {
        report.push(
            "build",
            Status::Missing,
            format!("{} (run setup_hbm_simulation.sh first)", build.display()),
        );
        return report;
    }
    report.push("build", Status::Ok, build.display().to_string());

    let ip = layout.ip_dir();
    report.require("ip", ip.is_dir(), ip.display().to_string());
    for name in BASE_IPS {
        let xci = ip.join(name).join(format!("{}.xci", name));
        report.require(format!("ip {}", name), xci.is_file(), xci.display().to_string());
    }

    let bd = layout.block_design_dir();
    report.require(BLOCK_DESIGN, bd.is_dir(), bd.display().to_string());
    let wrapper = bd.join("sim").join(format!("{}_wrapper.v", BLOCK_DESIGN));
    report.require(
        format!("{}_wrapper.v", BLOCK_DESIGN),
        wrapper.is_file(),
        wrapper.display().to_string(),
    );

    report
}
