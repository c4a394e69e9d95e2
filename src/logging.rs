//! Subscriber setup for the desktop host. The library only emits events.

use tracing_subscriber::{EnvFilter, fmt};

/// `-v` count to a default filter; `RUST_LOG` wins when set.
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(verbosity_filter(verbosity))?,
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing init: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_filter(0), "info");
        assert_eq!(verbosity_filter(1), "debug");
        assert_eq!(verbosity_filter(2), "trace");
        assert_eq!(verbosity_filter(9), "trace");
    }
}
