//! Diagnostic logging through the `log` facade and `env_logger`.
//!
//! Results go to stdout; log records go to stderr. The level comes from
//! `RUST_LOG` when it is set, otherwise from the `-v`/`-q` flags:
//!
//! | flags   | level |
//! |---------|-------|
//! | `-q`    | error |
//! | (none)  | warn  |
//! | `-v`    | info  |
//! | `-vv`   | debug |
//! | `-vvv`  | trace |

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialise the global logger. Calling it twice is harmless.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 2 {
            writeln!(
                buf,
                "{style}{level:<5}{style:#} [{}] {}",
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
        }
    });

    if builder.try_init().is_err() {
        log::debug!("logger already initialised");
    }
}

/// Map CLI flags to a level filter; `quiet` wins over `verbose`.
const fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }

    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
