use {
    crate::config::Config,
    std::{io::IsTerminal, panic::PanicHookInfo, sync::Once},
    time::macros::format_description,
    tracing::Level,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Initializes tracing setup that is shared between all users of the
/// protocol crates. `env_filter` has similar syntax to env_logger. It is
/// documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(config: &Config) {
    // The tracing subscriber below is global object so initializing it again in the
    // same process by a different thread would fail.
    static ONCE: Once = Once::new();
    ONCE.call_once(|| initialize(config));
}

fn set_tracing_subscriber(config: &Config) {
    let stderr_threshold = config.stderr_threshold.unwrap_or(Level::ERROR);

    // The json and the plain formatter have different types, so the shared
    // part of the setup is spelled out once per branch.
    macro_rules! fmt_layer {
        ($($format:tt)*) => {{
            tracing_subscriber::fmt::layer()
                $($format)*
                .with_writer(
                    std::io::stdout
                        .with_min_level(stderr_threshold)
                        .or_else(std::io::stderr),
                )
                .with_timer(UtcTime::new(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                )))
                .with_filter(EnvFilter::new(&config.env_filter))
                .boxed()
        }};
    }

    let layer = if config.use_json_format {
        fmt_layer!(.json())
    } else {
        fmt_layer!(.with_ansi(std::io::stdout().is_terminal()))
    };

    tracing_subscriber::registry().with(layer).init();
    tracing::info!(filter = %config.env_filter, "initialized tracing");
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentrant_initialization() {
        let config = Config::default().with_env_filter("debug");
        initialize_reentrant(&config);
        initialize_reentrant(&config);
        tracing::debug!("still alive");
    }
}
