//! Logging init: tracing events to stderr, printed above any progress bars.

use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::progress;

/// Stderr writer that clears the progress bars while a line is written.
pub struct BarAwareStderr;

impl Write for BarAwareStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        progress::suspend(|| io::stderr().lock().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().lock().flush()
    }
}

struct BarAwareMakeWriter;

impl<'a> MakeWriter<'a> for BarAwareMakeWriter {
    type Writer = BarAwareStderr;

    fn make_writer(&'a self) -> Self::Writer {
        BarAwareStderr
    }
}

/// Initialize logging. `RUST_LOG` overrides the default `info` level.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(BarAwareMakeWriter)
        .with_target(false)
        .try_init();
}
