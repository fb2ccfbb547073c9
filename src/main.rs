use anyhow::Result;
use blocktime::artifacts::ArtifactBundle;
use blocktime::cli::{Cli, OutputFormat};
use blocktime::collaborators::Collaborators;
use blocktime::config::EngineConfig;
use blocktime::context::ComputeContext;
use blocktime::metric;
use blocktime::report::{MetricReport, ReportCacheStats};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Cli) -> Result<EngineConfig> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let bundle = ArtifactBundle::from_file(&args.input)?;
    let mode = args.mode.resolve(&bundle.settings);
    let inputs = bundle.into_inputs(Some(config.simulation.clone()))?;
    tracing::debug!("Computing {} TBT for a {} run", mode, inputs.gather_mode());

    let ctx = ComputeContext::new(Collaborators::reference(&config));
    let result = metric::total_blocking_time(mode, &inputs, &ctx)?;

    let mut report = MetricReport::total_blocking_time(mode, inputs.gather_mode(), &result);
    if args.debug {
        report = report.with_cache_stats(ReportCacheStats::new(
            ctx.metric_cache_stats(),
            ctx.trace_cache_stats(),
        ));
    }

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
