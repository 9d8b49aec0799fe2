use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// 一行一個 JSON 物件，給日誌收集器用
    Json,
}

/// `RUST_LOG` wins over the verbosity flag when it is set.
fn build_filter(verbose: bool) -> EnvFilter {
    let default_directive = if verbose {
        "servicebook=debug,info"
    } else {
        "servicebook=info,warn"
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free
/// for command output such as the comparison CSV.
pub fn init(format: LogFormat, verbose: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(build_filter(verbose));
    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}
