use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tabload=debug")),
        )
        .with_test_writer() // Redirect logs to the test output
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber); // ignore "already set"
}
