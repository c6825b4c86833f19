use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use panelcraft::{
    BatchConfig, BatchMode, BatchRequest, CancelToken, Catalog, ImageRef, LogoRef, Orchestrator,
    OutputEncoding, OverrideTable, PreparedLogo, SourceImage, SvgRasterizerFactory,
    compose_template, compute_region_statistics, decide_placement, plan_jobs,
};

#[derive(Parser, Debug)]
#[command(name = "panelcraft", version, about = "Batch promo image generator")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every source × format into an output directory.
    Render(RenderArgs),
    /// Print region statistics and the placement decision for one image.
    Analyze(AnalyzeArgs),
    /// Print the composed template JSON for one campaign and format.
    Template(TemplateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Directory of source images.
    #[arg(long)]
    assets: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Catalog JSON (campaigns, formats, logo, selection strategy).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Placement overrides JSON keyed by asset file name.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Comma-separated format ids (default: all).
    #[arg(long, value_delimiter = ',')]
    formats: Vec<String>,

    /// Comma-separated campaign ids (default: all).
    #[arg(long, value_delimiter = ',', conflicts_with = "each_asset")]
    campaigns: Vec<String>,

    /// Render every asset with this campaign's copy instead of one source per campaign.
    #[arg(long, value_name = "CAMPAIGN")]
    each_asset: Option<String>,

    /// Worker threads (default: one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// Per-job render deadline in seconds; 0 disables it.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Retries after a rasterizer crash or resource exhaustion.
    #[arg(long, default_value_t = 1)]
    max_retries: u32,

    /// Jobs per rasterizer before a worker replaces it; 0 never recycles.
    #[arg(long, default_value_t = 64)]
    recycle_after: usize,

    /// Cancel the remaining jobs after this many failures.
    #[arg(long)]
    max_failures: Option<usize>,

    /// Write PNG instead of JPEG.
    #[arg(long, default_value_t = false)]
    png: bool,

    /// Extra font directory (repeatable).
    #[arg(long)]
    font_dir: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Image to analyze.
    #[arg(long)]
    image: PathBuf,

    /// Format id the decision is made for.
    #[arg(long, default_value = "square")]
    format: String,

    /// Catalog JSON providing the format table.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Placement overrides JSON keyed by asset file name.
    #[arg(long)]
    overrides: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// Campaign id.
    #[arg(long)]
    campaign: String,

    /// Format id.
    #[arg(long)]
    format: String,

    /// Optional background image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Catalog JSON.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Placement overrides JSON keyed by asset file name.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Directory the catalog logo path is relative to.
    #[arg(long, default_value = ".")]
    assets: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let res = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Analyze(args) => cmd_analyze(args).map(|()| 0),
        Command::Template(args) => cmd_template(args).map(|()| 0),
    };
    match res {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(p) => Ok(Catalog::from_path(p)?),
        None => Ok(Catalog::default()),
    }
}

fn load_overrides(path: Option<&Path>) -> anyhow::Result<OverrideTable> {
    match path {
        Some(p) => Ok(OverrideTable::from_path(p)?),
        None => Ok(OverrideTable::default()),
    }
}

fn load_logo(catalog: &Catalog, asset_dir: &Path) -> anyhow::Result<Option<Arc<PreparedLogo>>> {
    let Some(logo) = &catalog.logo else {
        return Ok(None);
    };
    let path = if logo.is_absolute() {
        logo.clone()
    } else {
        asset_dir.join(logo)
    };
    let prepared = PreparedLogo::load(&path)?;
    Ok(Some(Arc::new(prepared)))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<u8> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let overrides = load_overrides(args.overrides.as_deref())?;
    let logo = load_logo(&catalog, &args.assets)?;

    let encoding = if args.png {
        OutputEncoding::Png
    } else {
        OutputEncoding::default()
    };
    let mode = match args.each_asset {
        Some(campaign) => BatchMode::Assets { campaign },
        None => BatchMode::Campaigns(args.campaigns),
    };
    let request = BatchRequest {
        asset_dir: args.assets,
        out_dir: args.out,
        formats: args.formats,
        mode,
        encoding,
    };
    let jobs = plan_jobs(&catalog, &request, &catalog.selection)?;

    let config = BatchConfig {
        threads: args.threads,
        render_timeout: (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs)),
        max_retries: args.max_retries,
        recycle_after: args.recycle_after,
        max_failures: args.max_failures,
    };
    let factory = Arc::new(SvgRasterizerFactory::new(args.font_dir, encoding));
    let orchestrator =
        Orchestrator::new(Arc::new(catalog), Arc::new(overrides), factory, config).with_logo(logo);

    let summary = orchestrator.run_batch(&jobs, &CancelToken::new())?;
    for failure in &summary.failed {
        eprintln!(
            "failed {} [{}]: {:?}: {}",
            failure.job.source_id, failure.job.format_id, failure.kind, failure.reason
        );
    }
    for (source, tally) in &summary.by_source {
        eprintln!("{source}: {} ok, {} failed", tally.succeeded, tally.failed);
    }
    let status = summary.status();
    eprintln!(
        "rendered {}/{} ({status:?})",
        summary.succeeded.len(),
        summary.total()
    );
    Ok(status.exit_code() as u8)
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let overrides = load_overrides(args.overrides.as_deref())?;
    let format = catalog.format(&args.format)?;

    let src = SourceImage::open(&args.image)?;
    let stats = compute_region_statistics(&src)?;
    let decision = decide_placement(Some(&stats), overrides.get(&src.id), format);

    let report = serde_json::json!({
        "image": src.id,
        "width": src.width,
        "height": src.height,
        "format": format,
        "regions": stats,
        "decision": decision,
    });
    let text = serde_json::to_string_pretty(&report).context("serialize analysis report")?;
    println!("{text}");
    Ok(())
}

fn cmd_template(args: TemplateArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let overrides = load_overrides(args.overrides.as_deref())?;
    let campaign = catalog.campaign(&args.campaign)?;
    let format = catalog.format(&args.format)?;
    let logo = load_logo(&catalog, &args.assets)?;

    let src = args.image.as_deref().map(SourceImage::open).transpose()?;
    let stats = src.as_ref().map(compute_region_statistics).transpose()?;
    let rule = src.as_ref().and_then(|s| overrides.get(&s.id));
    let decision = decide_placement(stats.as_ref(), rule, format);

    let background = src.as_ref().map(|s| ImageRef {
        id: s.id.clone(),
        width: s.width,
        height: s.height,
    });
    let logo = logo.as_deref().map(|l| LogoRef {
        id: l.id.clone(),
        width: l.width,
        height: l.height,
    });
    let template = compose_template(
        campaign,
        format,
        &decision,
        background.as_ref(),
        logo.as_ref(),
        &catalog.brand,
    );
    println!("{}", template.to_json_pretty()?);
    Ok(())
}
