//! Environment variables the vendor flow depends on.

use crate::Result;
use anyhow::bail;
use std::ffi::OsString;
use std::path::PathBuf;

pub const VIVADO_DIR: &str = "VIVADO_DIR";
pub const COMPILED_LIB_DIR: &str = "COMPILED_LIB_DIR";

const VIVADO_DIR_EXAMPLE: &str = "export VIVADO_DIR=/your/vivado/installation/path/Vivado/2021.2";

#[derive(Debug, Clone)]
pub struct SimEnv {
    pub vivado_dir: PathBuf,
    pub compiled_lib_dir: Option<PathBuf>,
}

impl SimEnv {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build from an arbitrary variable lookup. `VIVADO_DIR` must name an
    /// existing path; `COMPILED_LIB_DIR` is only reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let vivado_dir = match lookup(VIVADO_DIR).filter(|v| !v.is_empty()) {
            Some(v) => PathBuf::from(v),
            None => bail!("{} is not set (example: {})", VIVADO_DIR, VIVADO_DIR_EXAMPLE),
        };
        if !vivado_dir.exists() {
            bail!("{} does not exist: {}", VIVADO_DIR, vivado_dir.display());
        }

        let compiled_lib_dir = lookup(COMPILED_LIB_DIR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        match &compiled_lib_dir {
            Some(dir) => log::info!("{}: {}", COMPILED_LIB_DIR, dir.display()),
            None => log::debug!("{} is not set", COMPILED_LIB_DIR),
        }

        Ok(Self {
            vivado_dir,
            compiled_lib_dir,
        })
    }
}
