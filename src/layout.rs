//! Directory layout of the simulation tree.
//!
//! ```text
//! <sim>/
//!   build/              packet generator output, rewritten configs
//!     ip/design_1/      HBM block design (setup_hbm_simulation.sh)
//!   testcases/<tc>/     one <name>.json per test case
//!   scripts/            simulate.sh, simulate_hbm.sh
//! ```

use crate::Result;
use anyhow::{Context, bail};
use std::fs;
use std::path::{Path, PathBuf};

pub const BLOCK_DESIGN: &str = "design_1";

#[derive(Debug, Clone)]
pub struct SimLayout {
    root: PathBuf,
}

impl SimLayout {
    /// The root is made absolute so paths handed to subprocesses survive
    /// their `current_dir`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` against the simulation root unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    pub fn ip_dir(&self) -> PathBuf {
        self.build_dir().join("ip")
    }

    pub fn block_design_dir(&self) -> PathBuf {
        self.ip_dir().join(BLOCK_DESIGN)
    }

    pub fn testcases_dir(&self) -> PathBuf {
        self.root.join("testcases")
    }

    pub fn testcase_dir(&self, testcase: &str) -> PathBuf {
        self.testcases_dir().join(testcase)
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    /// The HBM block design must be generated before any simulation.
    pub fn check_block_design(&self) -> Result<()> {
        let dir = self.block_design_dir();
        if !dir.is_dir() {
            bail!(
                "HBM block design not generated ({} is missing), run first: cd scripts && ./setup_hbm_simulation.sh",
                dir.display()
            );
        }
        log::info!("HBM block design ready: {}", dir.display());
        Ok(())
    }

    pub fn ensure_build_dir(&self) -> Result<PathBuf> {
        let dir = self.build_dir();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_directories_from_root() {
        let layout = SimLayout::new("/work/RecoNIC/sim");
        assert_eq!(
            layout.block_design_dir(),
            PathBuf::from("/work/RecoNIC/sim/build/ip/design_1")
        );
        assert_eq!(
            layout.testcase_dir("read_2rdma_hbm"),
            PathBuf::from("/work/RecoNIC/sim/testcases/read_2rdma_hbm")
        );
        assert_eq!(layout.scripts_dir(), PathBuf::from("/work/RecoNIC/sim/scripts"));
    }

    #[test]
    fn relative_root_becomes_absolute() {
        let layout = SimLayout::new(".");
        assert!(layout.root().is_absolute());
        assert!(layout.build_dir().is_absolute());
        assert!(layout.resolve(Path::new("packet_gen.py")).is_absolute());
        assert_eq!(
            layout.resolve(Path::new("packet_gen.py")),
            std::env::current_dir().unwrap().join("packet_gen.py")
        );
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let layout = SimLayout::new("/sim");
        assert_eq!(
            layout.resolve(Path::new("/usr/bin/pktgen")),
            PathBuf::from("/usr/bin/pktgen")
        );
        assert_eq!(
            layout.resolve(Path::new("packet_gen.py")),
            PathBuf::from("/sim/packet_gen.py")
        );
    }

    #[test]
    fn missing_block_design_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = SimLayout::new(tmp.path());
        fs::create_dir_all(layout.ip_dir()).unwrap();

        let err = layout.check_block_design().unwrap_err();
        assert!(err.to_string().contains("setup_hbm_simulation.sh"));

        fs::create_dir_all(layout.block_design_dir()).unwrap();
        layout.check_block_design().unwrap();
    }

    #[test]
    fn ensure_build_dir_creates_it() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = SimLayout::new(tmp.path());
        let dir = layout.ensure_build_dir().unwrap();
        assert!(dir.is_dir());
        // second call is a no-op
        layout.ensure_build_dir().unwrap();
    }
}
