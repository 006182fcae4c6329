use std::process::ExitCode;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use xmllint_action::{
    Cli, ConfigManager, GithubEnvironment, Result, SystemEnvProvider, ValidationEngine,
    ValidationResults, github, output,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(results) => ExitCode::from(results.exit_code()),
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<ValidationResults> {
    let workspace = std::env::current_dir()?;
    let config = ConfigManager::load_config(&cli, &workspace).await?;
    tracing::debug!("Configuration: {:?}", config);

    let engine = ValidationEngine::from_config(&config, workspace)?;
    let results = engine.run().await?;

    github::emit_annotations(std::io::stdout().lock(), &results.errors)?;

    let github = GithubEnvironment::from_env(&SystemEnvProvider);
    github
        .set_output("errors-json", &output::to_json(&results.errors)?)
        .await?;
    github
        .set_output("errors-html", &output::to_html(&results.errors))
        .await?;
    github
        .append_summary(&output::summary(&results.errors))
        .await?;

    Ok(results)
}
