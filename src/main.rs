// Main entry point - Dependency injection and rendering
use std::sync::Arc;

use timeseries_binding::infrastructure::config::load_binding_config;
use timeseries_binding::infrastructure::json_source::JsonFileRepository;
use timeseries_binding::{BindingService, OutputFormat};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = load_binding_config()?;
    let format = config.decimal_format()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(
        JsonFileRepository::new(config.data_dir.clone(), config.sample_policy)
            .with_trend_line_color(config.trend_line_color.clone()),
    );

    // Create service (application layer)
    let service = BindingService::new(repository, format, config.locale);

    let mut args = std::env::args().skip(1);
    let Some(dataset_id) = args.next() else {
        for id in service.list_datasets()? {
            println!("{}", id);
        }
        return Ok(());
    };
    let output = match args.next() {
        Some(raw) => raw.parse::<OutputFormat>()?,
        None => config.output,
    };

    println!("{}", service.render(&dataset_id, output)?);

    Ok(())
}
