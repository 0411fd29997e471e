use crate::Result;
use crate::layout::SimLayout;
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;
use std::path::PathBuf;

const NAME_RE: &str = r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$";

/// Reject names that could escape `testcases/`.
pub fn validate_name(name: &str) -> Result<()> {
    let re = Regex::new(NAME_RE)?;
    if !re.is_match(name) || name.contains("..") {
        bail!("invalid test case name {:?}", name);
    }
    Ok(())
}

/// Find the single `*.json` configuration inside `testcases/<tc>/`.
pub fn locate_config(layout: &SimLayout, testcase: &str) -> Result<PathBuf> {
    validate_name(testcase)?;

    let dir = layout.testcase_dir(testcase);
    if !dir.is_dir() {
        bail!("test case directory does not exist: {}", dir.display());
    }

    let mut configs = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            configs.push(path);
        }
    }
    configs.sort();

    match configs.len() {
        0 => bail!("no test case configuration (*.json) in {}", dir.display()),
        1 => {
            let config = configs.remove(0);
            log::info!("using configuration file: {}", config.display());
            Ok(config)
        }
        _ => bail!(
            "test case directory {} contains multiple configuration files: {:?}",
            dir.display(),
            configs
        ),
    }
}
