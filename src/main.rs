use clap::Parser;
use f1_elo_processor::{
    args::Args,
    error::ProcessorError,
    model::{config::EngineConfig, series_model::SeriesModel},
    store::{
        event_source::ReplayInput,
        snapshot_sink::{JsonFileSink, SnapshotSink}
    }
};
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let indicatif_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}

fn run(args: &Args) -> Result<(), ProcessorError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default()
    };
    if args.no_normalize {
        config.normalization.enabled = false;
    }
    config.validate()?;

    let input = ReplayInput::from_file(&args.input)?;
    let mut model = SeriesModel::new(config, input.lineage_resolver());

    let stats = model.process(&input.events)?;
    info!(
        events = stats.events,
        driver_matchups = stats.applied.drivers.total(),
        lineage_matchups = stats.applied.lineages.total(),
        excluded = stats.excluded.drivers.total() + stats.excluded.lineages.total(),
        "Processed events"
    );

    let export = model.export(&input.driver_names(), &input.lineage_names(model.lineage_resolver()));
    JsonFileSink::new(&args.output).write(&export)?;

    Ok(())
}
