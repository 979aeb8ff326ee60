use tracing_subscriber::EnvFilter;

fn main() {
    // Debug logging (request/retry traces) lands on stderr so it never mixes
    // with table/JSON/CSV output. Enable with RUST_LOG=ghl_cli=debug.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    ghl_cli::run_cli();
}
