use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use implantx::stub::StubInference;
use implantx::{
    EmbeddingStore, FieldMap, FormIntakeClient, HttpInferenceClient, InferenceClient,
    IntakeConfig, Ranker, Reconciler, ReconcilerConfig, Scheduler,
};

/// Identify dental implants from radiographs and publish the results
#[derive(Parser, Debug)]
#[command(name = "implantx")]
#[command(about = "Implant identification and result reconciliation", long_about = None)]
struct Args {
    /// Path to the implant catalog (JSON array of reference entries)
    #[arg(short, long)]
    catalog: PathBuf,

    /// Embedding dimension of the catalog
    #[arg(long, default_value_t = 512)]
    dim: usize,

    /// Seconds between reconciliation cycles
    #[arg(short, long, default_value_t = 60)]
    interval: u64,

    /// Run a single cycle and exit
    #[arg(short, long)]
    once: bool,

    /// Intake platform API key (falls back to the INTAKE_API_KEY env var)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Base URL of the form-intake platform
    #[arg(long, default_value = "https://api.jotform.com")]
    intake_url: String,

    /// Form holding dentist submissions
    #[arg(long, default_value = "251625025918659")]
    main_form: String,

    /// Form receiving published outcomes
    #[arg(long, default_value = "251627519817061")]
    results_form: String,

    /// Base URL of the inference service
    #[arg(long, default_value = "http://localhost:8001")]
    inference_url: String,

    /// Ranked matches per published outcome
    #[arg(long, default_value_t = 3)]
    top_k: usize,

    /// Per-call HTTP timeout in seconds
    #[arg(long, default_value_t = 10)]
    request_timeout: u64,

    /// Log per-cycle wall-clock timing
    #[arg(short, long)]
    monitor: bool,

    /// Use the built-in offline inference stub instead of the inference
    /// service (demo only)
    #[arg(long)]
    offline_stub: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(api_key) = args
        .api_key
        .or_else(|| std::env::var("INTAKE_API_KEY").ok())
    else {
        eprintln!("Error: no intake API key. Pass --api-key or set INTAKE_API_KEY.");
        std::process::exit(1);
    };

    info!("Starting ImplantX v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("Intake platform: {}", args.intake_url);

    let store = Arc::new(EmbeddingStore::load_json_file(args.dim, &args.catalog)?);
    info!("Catalog loaded: {} implants, dimension {}", store.len(), store.dim());

    let ranker = Ranker::new(store);

    let request_timeout = Duration::from_secs(args.request_timeout);
    let intake = FormIntakeClient::new(IntakeConfig {
        base_url: args.intake_url,
        api_key,
        main_form_id: args.main_form,
        results_form_id: args.results_form,
        page_limit: 1000,
        request_timeout,
        fields: FieldMap::default(),
    })?;

    let inference: Arc<dyn InferenceClient> = if args.offline_stub {
        info!("Using the offline inference stub (demo mode)");
        Arc::new(StubInference::new(args.dim))
    } else {
        info!("Inference service: {}", args.inference_url);
        Arc::new(HttpInferenceClient::new(args.inference_url, request_timeout)?)
    };

    let reconciler = Reconciler::new(
        ranker,
        Arc::new(intake),
        inference,
        ReconcilerConfig {
            top_k: args.top_k,
            ..ReconcilerConfig::default()
        },
    );

    if args.once {
        let stats = reconciler.run_cycle().await?;
        info!(
            fetched = stats.fetched,
            already_published = stats.already_published,
            published = stats.published,
            failed = stats.failed,
            "single cycle finished"
        );
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, finishing current cycle");
            token.cancel();
        }
    });

    info!("Reconciling every {}s, press Ctrl+C to stop", args.interval);
    Scheduler::new(Duration::from_secs(args.interval))
        .with_monitor(args.monitor)
        .run(&reconciler, shutdown)
        .await;

    info!("Shut down cleanly");
    Ok(())
}
