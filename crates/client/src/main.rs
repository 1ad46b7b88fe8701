use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use stockroom_client::cli::{App, Cli};
use stockroom_client::{ClientConfig, FileTokenStore, Session};
use stockroom_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    stockroom_observability::tracing::init(LogFormat::Pretty, "warn");

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }

    let path = match &config.session_file {
        Some(path) => path.clone(),
        None => FileTokenStore::default_path()?,
    };
    let session = Session::restore_or_reset(FileTokenStore::new(&path))
        .with_context(|| format!("failed to read session from {}", path.display()))?;

    let app = App::new(&config, Arc::new(session));
    let outcome = app
        .run(cli.command, &mut io::stdout(), &mut io::stderr())
        .await?;

    Ok(outcome.into())
}
