//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the filter depends on the
//! environment, and production logs are emitted as JSON lines.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "keltech_progress=debug,tower_http=debug,info",
        Environment::Staging => "keltech_progress=debug,tower_http=info,info",
        Environment::Prod => "keltech_progress=info,tower_http=info,warn",
    }
}

pub fn init_logging(env: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    // Source locations only help when reading logs locally.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    match env {
        Environment::Prod => registry.with(fmt_layer.json()).init(),
        Environment::Dev | Environment::Staging => registry.with(fmt_layer.pretty()).init(),
    }

    tracing::info!(env = ?env, "Logging initialized");
}
