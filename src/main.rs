//! fieldmatch - Entry Point

use clap::{Args as ClapArgs, Parser, Subcommand};
use fieldmatch::config::{self, CliOverrides, ResolvedConfig};
use fieldmatch::export::ExportPayload;
use fieldmatch::highlight::{
    HighlightResolver, LineMetadataLookup, PageDimensionCache, ZoomLevel,
};
use fieldmatch::model::error::AppError;
use fieldmatch::model::error::SourceError;
use fieldmatch::model::{
    BoundingBox, ComparisonRow, DocumentHandle, InvalidDocumentHandle, PageIndex, RenderSize,
};
use fieldmatch::source::{self, FileSource};
use fieldmatch::state::{
    next_field, ApprovalMap, HighlightState, NavigationScope, QaNavigation, ReconciliationSession,
};
use fieldmatch::view_state::{
    DevicePixelRatio, PagePlacement, PaintRect, PanGeometry, PanTracker, ViewportMapper,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// fieldmatch - reconcile two field extractions and locate fields on the page
#[derive(Parser, Debug)]
#[command(name = "fieldmatch")]
#[command(version)]
#[command(about = "Reconcile two model extractions of one document and map fields to page regions")]
struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Field count above which a line counts as a table row
    #[arg(long, global = true)]
    density_threshold: Option<usize>,

    /// Render target width for line lookups
    #[arg(long, global = true)]
    render_width: Option<f64>,

    /// Render target height for line lookups
    #[arg(long, global = true)]
    render_height: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align both runs and print the comparison rows
    Compare(RunArgs),
    /// Reconstruct tables from the aligned rows
    Tables(RunArgs),
    /// Print the reconciled field list
    Export {
        #[command(flatten)]
        runs: RunArgs,
        /// Opaque document handle to stamp on the payload
        #[arg(long, value_parser = parse_document)]
        document: DocumentHandle,
    },
    /// Resolve line ids to page regions
    Highlight(HighlightArgs),
    /// Walk the review order and the horizontal pan for each field
    Review(ReviewArgs),
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Item list produced by the first model
    run_a: PathBuf,
    /// Item list produced by the second model
    run_b: PathBuf,
    /// JSON object of row label to approved value
    #[arg(long)]
    approvals: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct HighlightArgs {
    /// Extraction result holding `line_metadata`
    result: PathBuf,
    /// Line ids to highlight, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    lines: Vec<i64>,
    /// Document handle the result belongs to
    #[arg(long, value_parser = parse_document)]
    document: DocumentHandle,
    /// Zoom level in percent
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    zoom: u32,
    /// CSS width pages are displayed at (defaults to the render width at zoom)
    #[arg(long)]
    css_width: Option<f64>,
    /// Viewport height; when given, a scroll target is computed
    #[arg(long)]
    viewport_height: Option<f64>,
    /// Keep the previous highlight when nothing resolves
    #[arg(long)]
    preserve_highlight: bool,
}

#[derive(ClapArgs, Debug)]
struct ReviewArgs {
    #[command(flatten)]
    runs: RunArgs,
    /// Only visit mismatches without an approved value
    #[arg(long)]
    needs_review: bool,
    /// Width of the page container, in CSS pixels
    #[arg(long, default_value_t = 850.0)]
    container_width: f64,
    /// Furthest the container can scroll horizontally
    #[arg(long, default_value_t = 0.0)]
    max_scroll_left: f64,
}

fn parse_document(raw: &str) -> Result<DocumentHandle, InvalidDocumentHandle> {
    DocumentHandle::new(raw)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(with_env, cli_overrides(&args))
    };
    config.validate()?;

    fieldmatch::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args.command, &config))?;

    Ok(())
}

fn cli_overrides(args: &Args) -> CliOverrides {
    let preserve = match &args.command {
        Command::Highlight(h) if h.preserve_highlight => Some(true),
        _ => None,
    };
    CliOverrides {
        table_density_threshold: args.density_threshold,
        render_width: args.render_width,
        render_height: args.render_height,
        preserve_highlight_on_failure: preserve,
    }
}

async fn run(command: Command, config: &ResolvedConfig) -> Result<(), AppError> {
    match command {
        Command::Compare(runs) => {
            let session = load_session(&runs).await?;
            let rows: Vec<RowView<'_>> = session
                .rows()
                .iter()
                .map(|row| RowView {
                    row,
                    display: session.display_value(row),
                })
                .collect();
            info!(rows = rows.len(), "Compared runs");
            emit(&rows)
        }
        Command::Tables(runs) => {
            let session = load_session(&runs).await?;
            let result = session.tables(&config.cluster_options());
            info!(
                tables = result.tables.len(),
                info_rows = result.info_rows.len(),
                "Clustered rows"
            );
            emit(&result)
        }
        Command::Export { runs, document } => {
            let session = load_session(&runs).await?;
            let payload = ExportPayload::new(document, &session);
            info!(items = payload.total_items, "Exported reconciled fields");
            emit(&payload)
        }
        Command::Highlight(args) => emit(&highlight(args, config).await?),
        Command::Review(args) => {
            let session = load_session(&args.runs).await?;
            let steps = review(&session, &args, config);
            info!(steps = steps.len(), "Walked review order");
            emit(&steps)
        }
    }
}

async fn load_session(runs: &RunArgs) -> Result<ReconciliationSession, AppError> {
    let document = DocumentHandle::new(runs.run_a.display().to_string())
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;
    let files = FileSource::new(&runs.run_a, &runs.run_b);
    let (items_a, items_b) = source::fetch_both(&files, &document).await?;
    let approvals = match &runs.approvals {
        Some(path) => source::load_approvals(path)?,
        None => ApprovalMap::new(),
    };
    Ok(ReconciliationSession::with_approvals(items_a, items_b, approvals))
}

/// Row as printed by `compare`.
#[derive(Serialize)]
struct RowView<'a> {
    #[serde(flatten)]
    row: &'a ComparisonRow,
    display: &'a str,
}

#[derive(Serialize)]
struct ReviewStep<'a> {
    key: &'a str,
    display: &'a str,
    line: Option<usize>,
    scroll_left: f64,
}

/// One full lap of next-field navigation from a fresh position.
fn review<'a>(
    session: &'a ReconciliationSession,
    args: &ReviewArgs,
    config: &ResolvedConfig,
) -> Vec<ReviewStep<'a>> {
    let scope = if args.needs_review {
        NavigationScope::NeedsReview
    } else {
        NavigationScope::All
    };
    let geometry = PanGeometry {
        container_width: args.container_width,
        max_scroll_left: args.max_scroll_left,
    };
    let rows = session.rows();
    let mut nav = QaNavigation::new(scope);
    let mut pan = PanTracker::new(config.pan_fraction);
    let mut scroll_left = 0.0;
    let mut steps = Vec::new();
    let mut start = None;

    for _ in 0..rows.len() {
        nav = next_field(nav, rows, session.approvals());
        let Some(focus) = nav.focus(rows) else {
            break;
        };
        if start == Some(focus.index) {
            break;
        }
        start.get_or_insert(focus.index);

        if let Some(line) = focus.line {
            let (next, offset) = pan.pan(line, focus.sibling_index, focus.sibling_count, geometry);
            pan = next;
            scroll_left = offset.get();
        }
        steps.push(ReviewStep {
            key: &focus.row.key,
            display: session.display_value(focus.row),
            line: focus.line,
            scroll_left,
        });
    }
    steps
}

#[derive(Serialize)]
struct LineFailure {
    line: usize,
    error: String,
}

#[derive(Serialize)]
struct HighlightReport {
    target_page: Option<usize>,
    primary: Option<BoundingBox>,
    secondary: Vec<BoundingBox>,
    paint: Vec<PaintRect>,
    scroll_top: Option<f64>,
    failures: Vec<LineFailure>,
}

async fn highlight(
    args: HighlightArgs,
    config: &ResolvedConfig,
) -> Result<HighlightReport, AppError> {
    let lookup = source::load_line_metadata(&args.result, args.document.clone())?;
    let zoom = ZoomLevel::from_percent(args.zoom);
    let factor = f64::from(zoom.percent()) / 100.0;
    let base = config.render_size();
    let target = RenderSize::new(base.width * factor, base.height * factor);

    let pages = rendered_pages(&lookup, zoom, target);

    let resolver = HighlightResolver::new(lookup, args.document);
    let (state, ticket) = HighlightState::new(config.preserve_highlight_on_failure).begin();
    let resolution = resolver.resolve(&args.lines, target, &pages, zoom).await;
    let (state, settled) = state.settle(ticket, resolution.highlight());

    let failures = resolution
        .failures
        .iter()
        .map(|(line, err)| LineFailure {
            line: line.get(),
            error: err.to_string(),
        })
        .collect();

    let Some(set) = state.active() else {
        warn!(requested = args.lines.len(), ?settled, "Nothing to highlight");
        return Ok(HighlightReport {
            target_page: None,
            primary: None,
            secondary: Vec::new(),
            paint: Vec::new(),
            scroll_top: None,
            failures,
        });
    };
    let css_width = args.css_width.unwrap_or(target.width);
    let mapper = ViewportMapper::for_zoom(css_width, &pages, zoom, DevicePixelRatio::STANDARD)
        .ok_or_else(|| {
            SourceError::Unavailable(format!("css width {css_width} is not usable"))
        })?;
    let scroll_top = args.viewport_height.map(|height| {
        let placement = PagePlacement {
            page_top: set.primary.page.get() as f64 * mapper.scale().apply(target.height),
            canvas_offset: 0.0,
        };
        mapper.scroll_target(placement, &set.primary, height).get()
    });

    info!(
        ?settled,
        boxes = set.box_count(),
        page = set.target_page().display(),
        "Resolved highlight"
    );
    Ok(HighlightReport {
        target_page: Some(set.target_page().get()),
        primary: Some(set.primary),
        secondary: set.secondary.clone(),
        paint: set.boxes().map(|b| mapper.paint_rect(b)).collect(),
        scroll_top,
        failures,
    })
}

/// Without a renderer every page the metadata mentions counts as rendered at
/// `target`. The first page is always present so the display scale has a reference.
fn rendered_pages(
    lookup: &LineMetadataLookup,
    zoom: ZoomLevel,
    target: RenderSize,
) -> PageDimensionCache {
    let mut pages = PageDimensionCache::new();
    pages.insert(PageIndex::new(0), zoom, target);
    for page in lookup.pages() {
        pages.insert(page, zoom, target);
    }
    pages
}

fn emit<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
