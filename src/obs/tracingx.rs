use tracing_subscriber::EnvFilter;

/// `RUST_LOG` quando definido; senão `info` global com o core em `info` também.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
