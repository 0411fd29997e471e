//! Stimulus generation through the external packet generator.
//!
//! The generator is invoked as `<program> <kind> <config.json>` from the
//! build directory, where `<config.json>` is the test case configuration
//! with its top module already pointed at the HBM testbench.

use crate::Result;
use crate::layout::SimLayout;
use crate::testcase::{self, CL_TOP, TestConfig};
use anyhow::{Context, bail};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_PROGRAM: &str = "packet_gen.py";

/// Files a compute-logic run must leave in the build directory.
pub const CL_OUTPUTS: &[&str] = &["cl_init_mem.txt", "cl_ctl_cmd.txt", "cl_golden_data.txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StimulusKind {
    /// Compute-logic memory image, control commands and golden data.
    ComputeLogic,
    /// RDMA configuration plus packets.
    Rdma,
    /// Network packets only.
    Network,
}

impl StimulusKind {
    /// Pick the stimulus from the test case's own top module, before it is
    /// rewritten to the HBM testbench.
    pub fn select(original_top: Option<&str>, roce: bool) -> Self {
        match original_top {
            Some(CL_TOP) => StimulusKind::ComputeLogic,
            _ if roce => StimulusKind::Rdma,
            _ => StimulusKind::Network,
        }
    }

    pub fn as_arg(self) -> &'static str {
        match self {
            StimulusKind::ComputeLogic => "cl",
            StimulusKind::Rdma => "rdma",
            StimulusKind::Network => "pkt",
        }
    }

    fn expected_outputs(self) -> &'static [&'static str] {
        match self {
            StimulusKind::ComputeLogic => CL_OUTPUTS,
            StimulusKind::Rdma | StimulusKind::Network => &[],
        }
    }
}

impl fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StimulusKind::ComputeLogic => "compute logic stimulus",
            StimulusKind::Rdma => "RDMA configuration and packets",
            StimulusKind::Network => "network packets",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct PacketGen {
    program: PathBuf,
}

impl PacketGen {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn command(&self, build_dir: &Path, kind: StimulusKind, config: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(build_dir).arg(kind.as_arg()).arg(config);
        cmd
    }

    /// Regenerate stimulus files for `testcase` into `build/`.
    pub fn generate(&self, layout: &SimLayout, testcase: &str, roce: bool) -> Result<StimulusKind> {
        let config_path = testcase::locate_config(layout, testcase)?;
        let mut config = TestConfig::load(&config_path)?;
        let original_top = config.force_hbm_top();
        let kind = StimulusKind::select(original_top.as_ref().and_then(Value::as_str), roce);

        log::info!("generating packets for test case {}", testcase);
        let build_dir = layout.ensure_build_dir()?;
        let rewritten = build_dir.join(format!("{}.json", testcase));
        config.write(&rewritten)?;

        let mut cmd = self.command(&build_dir, kind, &rewritten);
        log::info!("generating {}", kind);
        log::debug!("running: {:?}", cmd);

        let status = cmd
            .status()
            .with_context(|| format!("start packet generator {}", self.program.display()))?;
        if !status.success() {
            bail!(
                "packet generation failed for {}: {} exited with {}",
                testcase,
                self.program.display(),
                status
            );
        }

        for file in kind.expected_outputs() {
            let path = build_dir.join(file);
            if !path.is_file() {
                bail!("packet generator did not produce {}", path.display());
            }
        }

        log::info!("packet generation succeeded");
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    #[test]
    fn selects_stimulus_kind() {
        assert_eq!(StimulusKind::select(Some("cl_tb_top"), true), StimulusKind::ComputeLogic);
        assert_eq!(StimulusKind::select(Some("rn_tb_top"), true), StimulusKind::Rdma);
        assert_eq!(StimulusKind::select(None, true), StimulusKind::Rdma);
        assert_eq!(StimulusKind::select(Some("rn_tb_top"), false), StimulusKind::Network);
    }

    #[test]
    fn command_runs_from_build_dir() {
        let pktgen = PacketGen::new("/sim/packet_gen.py");
        let cmd = pktgen.command(
            Path::new("/sim/build"),
            StimulusKind::Rdma,
            Path::new("/sim/build/tc.json"),
        );
        assert_eq!(cmd.get_program(), "/sim/packet_gen.py");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["rdma", "/sim/build/tc.json"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/sim/build")));
    }

    #[cfg(unix)]
    mod script {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::os::unix::fs::PermissionsExt;

        fn install(layout: &SimLayout, body: &str, config: Value) -> PacketGen {
            let dir = layout.testcase_dir("tc");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("tc.json"), config.to_string()).unwrap();

            let program = layout.root().join("pktgen.sh");
            fs::write(&program, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

            PacketGen::new(layout.resolve(Path::new("pktgen.sh")))
        }

        fn fixture(body: &str, config: Value) -> (tempfile::TempDir, SimLayout, PacketGen) {
            let tmp = tempfile::tempdir().unwrap();
            let layout = SimLayout::new(tmp.path());
            let pktgen = install(&layout, body, config);
            (tmp, layout, pktgen)
        }

        #[test]
        fn relative_sim_dir_reaches_generator_and_config() {
            let tmp = tempfile::tempdir_in(".").unwrap();
            let cwd = std::env::current_dir().unwrap();
            let relative = tmp.path().strip_prefix(&cwd).unwrap_or(tmp.path());
            assert!(relative.is_relative());

            let layout = SimLayout::new(relative);
            let pktgen = install(
                &layout,
                r#"cp "$2" seen.json"#,
                json!({ "top_module": "rn_tb_top" }),
            );
            assert!(pktgen.program().is_absolute());

            pktgen.generate(&layout, "tc", true).unwrap();
            let seen: Value = serde_json::from_str(
                &fs::read_to_string(layout.build_dir().join("seen.json")).unwrap(),
            )
            .unwrap();
            assert_eq!(seen, json!({ "top_module": "rn_tb_top_hbm" }));
        }

        #[test]
        fn passes_rewritten_config_to_generator() {
            let (_tmp, layout, pktgen) = fixture(
                r#"echo "$1" > args.txt; cp "$2" seen.json"#,
                json!({ "top_module": "rn_tb_top", "pkt_op": "read" }),
            );

            let kind = pktgen.generate(&layout, "tc", true).unwrap();
            assert_eq!(kind, StimulusKind::Rdma);

            let build = layout.build_dir();
            assert_eq!(fs::read_to_string(build.join("args.txt")).unwrap(), "rdma\n");
            let seen: Value =
                serde_json::from_str(&fs::read_to_string(build.join("seen.json")).unwrap())
                    .unwrap();
            assert_eq!(seen, json!({ "top_module": "rn_tb_top_hbm", "pkt_op": "read" }));
        }

        #[test]
        fn generator_failure_is_an_error() {
            let (_tmp, layout, pktgen) = fixture("exit 3", json!({ "top_module": "rn_tb_top" }));
            let err = pktgen.generate(&layout, "tc", false).unwrap_err();
            assert!(err.to_string().contains("packet generation failed"));
        }

        #[test]
        fn compute_logic_outputs_are_checked() {
            let (_tmp, layout, pktgen) = fixture(
                "touch cl_init_mem.txt cl_ctl_cmd.txt",
                json!({ "top_module": "cl_tb_top" }),
            );
            let err = pktgen.generate(&layout, "tc", false).unwrap_err();
            assert!(err.to_string().contains("cl_golden_data.txt"));
        }

        #[test]
        fn compute_logic_run_succeeds_with_all_outputs() {
            let (_tmp, layout, pktgen) = fixture(
                "touch cl_init_mem.txt cl_ctl_cmd.txt cl_golden_data.txt",
                json!({ "top_module": "cl_tb_top" }),
            );
            let kind = pktgen.generate(&layout, "tc", false).unwrap();
            assert_eq!(kind, StimulusKind::ComputeLogic);
        }
    }

    #[test]
    fn missing_program_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = SimLayout::new(tmp.path());
        let dir = layout.testcase_dir("tc");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tc.json"), "{}").unwrap();

        let pktgen = PacketGen::new(tmp.path().join("no_such_pktgen"));
        let err = pktgen.generate(&layout, "tc", false).unwrap_err();
        assert!(err.to_string().contains("start packet generator"));
    }
}
