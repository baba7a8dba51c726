use std::io;

use tracing_subscriber::registry::LookupSpan;

use crate::logging::{
    config::LoggingConfig,
    formatter::{build_fmt_layer, BoxedLayer},
};

/// Консольный слой (stdout) в формате из настроек.
pub fn layer_with_config<S>(config: &LoggingConfig) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    build_fmt_layer(
        config.format,
        &config.console,
        config.console.with_ansi,
        io::stdout as fn() -> io::Stdout,
    )
}
