use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
///
/// `RUST_LOG` directives are honoured; `ledger_core=info` is always added so the
/// crate's own events are visible without extra setup.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "ledger_core=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        // A host application may already own the global subscriber.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
