//! The `gridline` command-line tool.
//!
//! Runs filter/search/sort/page queries over a JSON array file, keeps saved
//! filters in a directory-backed store, and records an audit log next to them.
//!
//! ```text
//! gridline query people.json --where status__equals=active --sort age --desc
//! gridline query people.json --filter 'site__in=London%2CBoston' --format text
//! gridline filters save adults --where 'age__between=[18,65]'
//! gridline query people.json --saved adults --page 2
//! gridline audit --action filter --format text
//! ```

pub mod audit_log;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` is honored; without it only warnings are shown. Each `-v`
/// raises the gridline crates one level (debug, then trace).
pub fn init_logging(verbose: u8) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let level = match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    };
    if let Some(level) = level {
        for target in ["gridline_query", "gridline_cli"] {
            if let Ok(directive) = format!("{target}={level}").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
