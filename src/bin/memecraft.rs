use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memecraft::listing::{
    DEFAULT_LISTING_API, FALLBACK_DIMENSION, fetch_templates, filter_templates,
};
use memecraft::{
    AccessPathPlanner, AcquireError, AcquireOpts, AcquiredBytes, Acquirer, Captions,
    CommitOutcome, ComposeOpts, CpuTarget, HttpImageSource, Session, Template,
};

/// A template plus, for `--url` without an explicit size, the one acquisition made to size it.
struct Resolved {
    template: Template,
    prefetched: Option<Result<AcquiredBytes, AcquireError>>,
}

/// Bold sans fonts tried when `--font` is not given.
const FONT_CANDIDATES: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

#[derive(Parser, Debug)]
#[command(name = "memecraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List templates, optionally filtered by name.
    List(ListArgs),
    /// Caption a template and save it as PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Case-insensitive name filter.
    #[arg(long, default_value = "")]
    query: String,

    /// Listing endpoint.
    #[arg(long, default_value = DEFAULT_LISTING_API)]
    api: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Template id from the listing.
    #[arg(long)]
    id: Option<String>,

    /// Image URL to caption directly.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Declared width for `--url` (defaults to the image's own width).
    #[arg(long, requires = "url")]
    width: Option<u32>,

    /// Declared height for `--url` (defaults to the image's own height).
    #[arg(long, requires = "url")]
    height: Option<u32>,

    /// Top caption.
    #[arg(long, default_value = "")]
    top: String,

    /// Bottom caption.
    #[arg(long, default_value = "")]
    bottom: String,

    /// Caption font (TTF/OTF). Defaults to a system bold sans.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output PNG path. Defaults to `meme-<id>.png` in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Per-attempt fetch timeout, in seconds.
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,

    /// Longest display side.
    #[arg(long, default_value_t = 600)]
    max_size: u32,

    /// Skip relays and only try the image URL itself.
    #[arg(long, default_value_t = false)]
    direct_only: bool,

    /// Listing endpoint used to resolve `--id`.
    #[arg(long, default_value = DEFAULT_LISTING_API)]
    api: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List(args) => cmd_list(args).await,
        Command::Render(args) => cmd_render(args).await,
    }
}

async fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let templates = fetch_templates(&client, &args.api)
        .await
        .context("Could not load memes. Try again later.")?;

    let hits = filter_templates(&templates, &args.query);
    if hits.is_empty() {
        eprintln!("no memes match '{}'", args.query.trim());
        return Ok(());
    }
    for t in hits {
        println!("{}\t{}x{}\t{}\t{}", t.id, t.width, t.height, t.name, t.url);
    }
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let font_path = resolve_font(args.font.as_deref())?;
    let target = CpuTarget::from_font_path(&font_path)
        .with_context(|| format!("load font '{}'", font_path.display()))?;

    let acquirer = build_acquirer(&args)?;
    let resolved = resolve_template(&args, &acquirer).await?;
    let opts = ComposeOpts {
        max_display_size: args.max_size,
        ..ComposeOpts::default()
    };
    let mut session = Session::new(target, opts);

    let outcome = match resolved.prefetched {
        Some(result) => {
            let ticket = session.select(resolved.template);
            session.commit(ticket, result)?
        }
        None => session.load(&acquirer, resolved.template).await?,
    };
    match outcome {
        CommitOutcome::Ready => {}
        CommitOutcome::Failed => {
            let failure = session
                .selection()
                .and_then(|s| s.state.failure())
                .context("selection failed without a reason")?;
            anyhow::bail!("{} ({failure})", failure.user_message());
        }
        CommitOutcome::Stale => anyhow::bail!("selection changed while loading"),
    }

    let plan = session
        .set_captions(Captions::new(args.top, args.bottom))?
        .context("nothing to draw")?;
    tracing::info!(
        width = plan.display_width,
        height = plan.display_height,
        font_px = plan.font_size_px,
        top_lines = plan.top.lines.len(),
        bottom_lines = plan.bottom.lines.len(),
        "rendered"
    );

    let export = session
        .export()
        .context("Download failed. Try taking a screenshot of the meme instead.")?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&export.file_name));
    export.write_to(&out)?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn build_acquirer(args: &RenderArgs) -> anyhow::Result<Acquirer> {
    let planner = if args.direct_only {
        AccessPathPlanner::direct_only()
    } else {
        AccessPathPlanner::default()
    };
    Ok(Acquirer::new(Arc::new(HttpImageSource::new()?))
        .with_planner(planner)
        .with_opts(AcquireOpts {
            timeout: Duration::from_secs(args.timeout_secs),
        }))
}

async fn resolve_template(args: &RenderArgs, acquirer: &Acquirer) -> anyhow::Result<Resolved> {
    if let Some(url) = &args.source.url {
        if let (Some(w), Some(h)) = (args.width, args.height) {
            return Ok(Resolved {
                template: Template::new("custom", url.clone(), "custom", w, h)?,
                prefetched: None,
            });
        }
        let result = acquirer.acquire(url).await;
        let (w, h) = intrinsic_dimensions(&result);
        let template = Template::new(
            "custom",
            url.clone(),
            "custom",
            args.width.unwrap_or(w),
            args.height.unwrap_or(h),
        )?;
        return Ok(Resolved {
            template,
            prefetched: Some(result),
        });
    }

    let id = args
        .source
        .id
        .as_deref()
        .context("either --id or --url is required")?;
    let client = reqwest::Client::new();
    let templates = fetch_templates(&client, &args.api)
        .await
        .context("Could not load memes. Try again later.")?;
    let template = templates
        .into_iter()
        .find(|t| t.id == id)
        .with_context(|| format!("no template with id '{id}'"))?;
    Ok(Resolved {
        template,
        prefetched: None,
    })
}

/// Size of the acquired image, or the listing fallback when there is nothing decodable.
/// The session reports the failure itself once the result is committed.
fn intrinsic_dimensions(result: &Result<AcquiredBytes, AcquireError>) -> (u32, u32) {
    result
        .as_ref()
        .ok()
        .and_then(|acquired| memecraft::decode_image(&acquired.bytes).ok())
        .map(|bitmap| bitmap.dimensions())
        .unwrap_or((FALLBACK_DIMENSION, FALLBACK_DIMENSION))
}

fn resolve_font(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .context("no caption font found; pass --font <path to a .ttf>")
}
