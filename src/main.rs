use anyhow::Context;
use available_cars::utils::{logger, validation::Validate};
use available_cars::{
    AvailabilityQuery, CliConfig, InMemoryStore, QueryRequest, QuerySettings, TomlConfig,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let toml = match &cli.config {
        Some(path) => Some(
            TomlConfig::from_file(path).with_context(|| format!("reading config {}", path))?,
        ),
        None => None,
    };

    let verbose = cli.verbose || toml.as_ref().is_some_and(TomlConfig::verbose);
    if cli.json_logs || toml.as_ref().is_some_and(TomlConfig::json_logs) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting available-cars");
    tracing::debug!("CLI config: {:?}", cli);

    let validation = match &toml {
        Some(config) => config.validate(),
        None => cli.validate(),
    };
    if let Err(e) = validation {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = match &toml {
        Some(config) => config.query_settings(),
        None => QuerySettings::from_provider(&cli),
    };
    let store_path = toml
        .as_ref()
        .and_then(TomlConfig::store_path)
        .unwrap_or(&cli.store)
        .to_string();

    let store = InMemoryStore::from_file(&store_path)
        .with_context(|| format!("loading store snapshot {}", store_path))?;

    let mut request = QueryRequest::new(cli.user);
    if let Some(start) = &cli.start {
        request = request.with_param(settings.start_param.clone(), start.clone());
    }
    if let Some(end) = &cli.end {
        request = request.with_param(settings.end_param.clone(), end.clone());
    }

    let query = AvailabilityQuery::new(store.clone(), store, settings);
    let result = query.execute(&request).await;

    if let Some(reason) = &result.error {
        tracing::warn!("Query returned no cars: {}", reason);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
