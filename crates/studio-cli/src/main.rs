//! `studio` — build template documents from session files.

mod dir_store;
mod session;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dir_store::DirStore;
use session::SessionFile;
use std::path::{Path, PathBuf};
use studio_build::{BuildConfig, TemplateBuilder, TemplateStore};
use studio_core::coords::preview_size;
use studio_core::{CanvasSpec, Color, PreviewConfig};

#[derive(Parser, Debug)]
#[command(name = "studio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session file and build its template into an output directory.
    Build(BuildArgs),
    /// List templates previously built into an output directory.
    List(ListArgs),
    /// Print the preview scale for a canvas size.
    Scale(ScaleArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Session description JSON.
    #[arg(long)]
    session: PathBuf,

    /// Directory receiving uploaded assets and the template document.
    #[arg(long)]
    out: PathBuf,

    /// Extra attempts after a transient upload failure.
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Upload thumbnail and background one after the other.
    #[arg(long)]
    sequential: bool,

    /// Also print the template JSON.
    #[arg(long)]
    print: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    #[arg(long)]
    out: PathBuf,

    /// Only show this category.
    #[arg(long)]
    category: Option<String>,
}

#[derive(Parser, Debug)]
struct ScaleArgs {
    #[arg(long)]
    width: f32,

    #[arg(long)]
    height: f32,

    #[arg(long, default_value_t = PreviewConfig::default().max_width)]
    max_width: f32,

    #[arg(long, default_value_t = PreviewConfig::default().max_height)]
    max_height: f32,

    #[arg(long, default_value_t = PreviewConfig::default().max_scale)]
    max_scale: f32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args).await,
        Command::List(args) => cmd_list(args).await,
        Command::Scale(args) => cmd_scale(args),
    }
}

async fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let session = SessionFile::load(&args.session)?;
    let base = args.session.parent().unwrap_or_else(|| Path::new("."));
    let mut state = session.replay(base)?;

    let mut request = state.build_request(session.name.clone(), session.category.clone());
    request.id = session.id.clone();

    let store = DirStore::new(&args.out);
    let builder = TemplateBuilder::new(&store, &store).with_config(BuildConfig {
        upload_retries: args.retries,
        concurrent_required_uploads: !args.sequential,
    });
    let report = builder
        .build(request)
        .await
        .with_context(|| format!("build template '{}'", session.name))?;

    println!("template {} -> {}", report.saved.id, report.saved.url);
    println!("{} element(s)", report.template.elements.len());
    if !report.warnings.is_empty() {
        eprintln!("{} layer(s) could not be included:", report.warnings.len());
        for warning in &report.warnings {
            eprintln!("  {warning}");
        }
    }
    if args.print {
        println!("{}", report.template.to_json_pretty()?);
    }

    state.teardown();
    Ok(())
}

async fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let store = DirStore::new(&args.out);
    let templates = store.list(args.category.as_deref()).await?;
    for t in &templates {
        println!("{}\t{}\t{}", t.id, t.category, t.name);
    }
    Ok(())
}

fn cmd_scale(args: ScaleArgs) -> anyhow::Result<()> {
    let canvas = CanvasSpec::new(args.width, args.height, Color::WHITE)?;
    let config = PreviewConfig {
        max_width: args.max_width,
        max_height: args.max_height,
        max_scale: args.max_scale,
    };
    let scale = config.scale_for(&canvas);
    let (w, h) = preview_size(&canvas, scale);
    println!("scale {:.1}% -> preview {w:.0}x{h:.0}", scale * 100.0);
    Ok(())
}
