use std::sync::Arc;

use color_eyre::eyre::Result;
use tracing::info;

use wordlens::analyzer::VocabularyAnalyzer;
use wordlens::cli::Cli;
use wordlens::log;
use wordlens::server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();
    let _log_guard = log::init(&cli.log_level, cli.log_file.as_deref())?;

    let analyzer = Arc::new(VocabularyAnalyzer::with_default_vocabularies()?);
    let server = Server::bind(&cli.bind_addr(), analyzer).await?;
    info!("wordlens server ready on ws://{}", server.local_addr()?);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
    }

    Ok(())
}
