//! Logger setup: `LEVEL:target:message` lines on stderr.

use log::LevelFilter;
use std::io::Write;

/// Install the global logger. `RUST_LOG` still overrides the default level.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{}:{}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
