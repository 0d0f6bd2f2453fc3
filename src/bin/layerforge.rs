use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layerforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a scene as the next numbered PNG artifact.
    Export(ExportArgs),
    /// Write the interactive preview (guides and border included) as a PNG.
    Preview(PreviewArgs),
    /// Print the overlay catalog resolved from a manifest as JSON.
    Catalog(CatalogArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Scene document JSON. Image paths resolve against its directory.
    #[arg(long)]
    scene: PathBuf,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gesture script replayed after the scene is applied.
    #[arg(long)]
    script: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Persisted counter state. Defaults to `<out_dir>/.layerforge-state.json`.
    #[arg(long)]
    state: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Manifest JSON. Missing or malformed manifests fall back to the default list.
    #[arg(long)]
    manifest: PathBuf,

    /// Base URL overlay file names are joined onto.
    #[arg(long, default_value = "/overlays")]
    base_url: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Catalog(args) => cmd_catalog(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<layerforge::EngineConfig> {
    let cfg = match path {
        Some(p) => layerforge::EngineConfig::from_json_file(p)?,
        None => layerforge::EngineConfig::default().with_env_overrides()?,
    };
    Ok(cfg)
}

fn build_editor(
    args: &SceneArgs,
    store: Box<dyn layerforge::KvStore>,
) -> anyhow::Result<layerforge::Editor> {
    let cfg = load_config(args.config.as_deref())?;
    let doc = layerforge::SceneDocument::from_path(&args.scene)
        .with_context(|| format!("load scene '{}'", args.scene.display()))?;
    let images = layerforge::ImageStore::with_root(layerforge::SceneDocument::asset_root(
        &args.scene,
    ));

    let mut editor = layerforge::Editor::new(cfg, images, store);
    doc.apply(&mut editor);
    if let Some(path) = &args.script {
        let script = layerforge::GestureScript::from_path(path)
            .with_context(|| format!("load script '{}'", path.display()))?;
        script.play(&mut editor);
    }
    Ok(editor)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let state = args
        .state
        .clone()
        .unwrap_or_else(|| args.out_dir.join(".layerforge-state.json"));
    let store = layerforge::JsonFileStore::open(&state)
        .with_context(|| format!("open state '{}'", state.display()))?;

    let mut editor = build_editor(&args.scene, Box::new(store))?;
    let mut sink = layerforge::DirSink::new(&args.out_dir);
    let artifact = editor
        .export(&mut sink)
        .context("export produced no artifact")?;

    eprintln!(
        "wrote {} ({}x{})",
        sink.path_for(&artifact.file_name).display(),
        artifact.width,
        artifact.height
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut editor = build_editor(&args.scene, Box::new(layerforge::MemoryStore::new()))?;
    let frame = editor
        .render_preview()
        .context("preview produced no frame")?;
    let png = layerforge::encode_png(&frame)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[derive(serde::Serialize)]
struct CatalogOut<'a> {
    fallback: bool,
    overlays: &'a [layerforge::OverlaySource],
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = layerforge::OverlayCatalog::from_path(&args.base_url, &args.manifest);
    let out = CatalogOut {
        fallback: catalog.is_fallback(),
        overlays: catalog.sources(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize catalog")?
    );
    Ok(())
}
