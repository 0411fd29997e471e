use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

mod doctor;
mod env;
mod flow;
mod layout;
mod logging;
mod pktgen;
mod sim;
mod testcase;

pub type Result<T> = anyhow::Result<T>;

/// Long flags that the harness historically accepted with a single dash.
const SINGLE_DASH_FLAGS: &[&str] = &[
    "debug",
    "questasim",
    "roce",
    "no_pktgen",
    "no_sim",
    "gui",
    "tc",
];

#[derive(Parser, Debug)]
#[command(name = "run-testcase-hbm")]
#[command(about = "RecoNIC HBM test case runner", long_about = None)]
#[command(after_help = "Examples:
  run-testcase-hbm -roce -tc read_2rdma_hbm -questasim -gui
  run-testcase-hbm -roce -tc write_2rdma_hbm -questasim
  run-testcase-hbm regression
  run-testcase-hbm check")]
struct Cli {
    /// Debug logging.
    #[arg(long)]
    debug: bool,

    /// Use Questa Sim (the only simulator the HBM testbench supports).
    #[arg(long)]
    questasim: bool,

    /// Generate RDMA configuration stimulus as well as packets.
    #[arg(long)]
    roce: bool,

    /// Run the test case without regenerating packets.
    #[arg(long = "no_pktgen")]
    no_pktgen: bool,

    /// Skip the simulator run.
    #[arg(long = "no_sim")]
    no_sim: bool,

    /// Open the simulator GUI.
    #[arg(long)]
    gui: bool,

    /// Test case to run.
    #[arg(long)]
    tc: Option<String>,

    /// Simulation root holding build/, testcases/ and scripts/.
    #[arg(long, env = "RECONIC_SIM_DIR", default_value = ".")]
    sim_dir: PathBuf,

    /// Packet generator program, relative paths resolve against the simulation root.
    #[arg(long, env = "RECONIC_PKTGEN", default_value = pktgen::DEFAULT_PROGRAM)]
    pktgen: PathBuf,

    /// Simulation script inside scripts/.
    #[arg(long, env = "RECONIC_SIM_SCRIPT", default_value = sim::DEFAULT_SCRIPT)]
    sim_script: String,

    /// `regression`, `check`, or empty for the test case given with -tc.
    mode: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Single,
    Regression,
    Check,
}

impl Mode {
    /// Unknown words fall back to a single test case run.
    fn from_word(word: Option<&str>) -> Self {
        match word.unwrap_or("") {
            "regression" => Mode::Regression,
            "check" => Mode::Check,
            "" => Mode::Single,
            other => {
                log::warn!("unknown mode {:?}, running a single test case", other);
                Mode::Single
            }
        }
    }
}

/// Rewrite `-tc` style flags into `--tc` so clap can parse them.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let rewritten = arg
                .to_str()
                .and_then(|s| s.strip_prefix('-'))
                .filter(|name| SINGLE_DASH_FLAGS.contains(name))
                .map(|name| OsString::from(format!("--{}", name)));
            rewritten.unwrap_or(arg)
        })
        .collect()
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    logging::init(cli.debug);

    if let Err(err) = run(cli) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let layout = layout::SimLayout::new(&cli.sim_dir);
    let pktgen = pktgen::PacketGen::new(layout.resolve(&cli.pktgen));
    let mode = Mode::from_word(cli.mode.as_deref());

    if mode == Mode::Check {
        let report = doctor::check(&layout, &pktgen, &cli.sim_script, |key| {
            std::env::var_os(key)
        });
        report.log();
        return report.into_result();
    }

    let sim_env = env::SimEnv::from_env()?;
    log::debug!(
        "vivado: {}, compiled libs: {:?}",
        sim_env.vivado_dir.display(),
        sim_env.compiled_lib_dir
    );
    layout.check_block_design()?;

    let ctx = flow::Context {
        layout: &layout,
        pktgen: &pktgen,
        sim_script: &cli.sim_script,
    };

    match mode {
        Mode::Regression => flow::run_regression(&ctx),
        Mode::Single | Mode::Check => flow::run_testcase(
            &ctx,
            &flow::RunOptions {
                testcase: cli.tc,
                questasim: cli.questasim,
                roce: cli.roce,
                no_pktgen: cli.no_pktgen,
                no_sim: cli.no_sim,
                gui: cli.gui,
            },
        ),
    }
}
