use clap::Parser;
use docnav_cli::DocnavCli;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DOCNAV_LOG";

fn main() -> anyhow::Result<()> {
    let cli = DocnavCli::parse();
    setup_tracing(cli.verbose);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(docnav_cli::run(cli))
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("docnav_navigator=debug,docnav_cli=debug,warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
