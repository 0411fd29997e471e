//! Single test case and regression control flow.

use crate::Result;
use crate::layout::SimLayout;
use crate::pktgen::PacketGen;
use crate::sim::SimRequest;
use crate::testcase::{self, HBM_TOP};
use anyhow::{Context as _, bail};

/// Test cases run by `regression`.
pub const REGRESSION_TESTCASES: &[&str] = &["read_2rdma_hbm", "write_2rdma_hbm"];

pub struct Context<'a> {
    pub layout: &'a SimLayout,
    pub pktgen: &'a PacketGen,
    pub sim_script: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub testcase: Option<String>,
    pub questasim: bool,
    pub roce: bool,
    pub no_pktgen: bool,
    pub no_sim: bool,
    pub gui: bool,
}

pub fn run_testcase(ctx: &Context<'_>, opts: &RunOptions) -> Result<()> {
    let Some(tc) = opts.testcase.as_deref() else {
        bail!("no test case given (-tc <name>)");
    };
    testcase::validate_name(tc)?;

    if opts.questasim {
        log::info!("HBM simulation runs on questasim");
    } else {
        log::warn!("HBM simulation only supports questasim, using it");
    }

    let top = testcase::resolve_top_module(ctx.layout, tc)?;

    if opts.no_pktgen {
        log::info!("skipping packet generation");
    } else {
        ctx.pktgen.generate(ctx.layout, tc, opts.roce)?;
    }

    if opts.no_sim {
        log::info!("skipping simulation");
    } else {
        SimRequest::hbm(tc, &top, opts.gui).run(ctx.layout, ctx.sim_script)?;
    }

    Ok(())
}

/// Run every regression test case with RDMA stimulus and no GUI. The first
/// failing test case ends the regression.
pub fn run_regression(ctx: &Context<'_>) -> Result<()> {
    run_testcases(ctx, REGRESSION_TESTCASES)
}

fn run_testcases(ctx: &Context<'_>, testcases: &[&str]) -> Result<()> {
    log::info!("starting HBM regression (questasim only)");

    for tc in testcases {
        log::info!("running test case: {}", tc);
        ctx.pktgen
            .generate(ctx.layout, tc, true)
            .and_then(|_| SimRequest::hbm(tc, HBM_TOP, false).run(ctx.layout, ctx.sim_script))
            .with_context(|| format!("regression test case {}", tc))?;
        log::info!("test case {} passed", tc);
    }

    log::info!("HBM regression finished: {} test cases passed", testcases.len());
    Ok(())
}
