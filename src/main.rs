//! `quarry`: imports the blocks around a point of a Minecraft save as an
//! instanced scene.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod export;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use quarry_blocks::CatalogStore;
use quarry_io::RegionStore;
use quarry_mesh::AtlasLayout;
use quarry_runtime::{
    AtlasImage, LoadContext, LoadError, LoadOutcome, RecordingScene, SceneSink, commit, load,
};
use quarry_world::{BlockPos, CenterSource, LevelInfo, has_dimension, list_saves};

use crate::config::Overrides;
use crate::export::ObjExporter;

#[derive(Parser)]
#[command(name = "quarry", version, about = "Import Minecraft worlds as instanced block scenes")]
struct Cli {
    /// Log filter, e.g. `debug` or `quarry_runtime=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Saves folder (default: QUARRY_SAVES, then the launcher's folder)
    #[arg(long, global = true)]
    saves: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the worlds in the saves folder
    List,
    /// Load the chunks around a point of a world and write the scene
    Load {
        /// World folder, or a folder name under the saves folder
        world: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Output directory
        #[arg(long, short, default_value = "quarry-out")]
        out: PathBuf,
        /// Assets root containing assets/blocks.toml
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Options file (default: ./quarry.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Load and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = level {
        builder.parse_filters(filter);
    }
    builder.init();
}

fn list(saves: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let dir = saves.ok_or("no saves folder known; pass --saves or set QUARRY_SAVES")?;
    let worlds = list_saves(dir);
    if worlds.is_empty() {
        println!("no worlds in {}", dir.display());
        return Ok(());
    }
    for w in worlds {
        let size = w
            .size_mib
            .map(|m| format!("{m:.1} MiB"))
            .unwrap_or_else(|| "? MiB".to_string());
        let mut dims = String::new();
        if w.has_nether {
            dims.push_str(" nether");
        }
        if w.has_end {
            dims.push_str(" end");
        }
        println!("{:<24} {:<32} {:>10}{}", w.folder, w.name, size, dims);
    }
    Ok(())
}

struct LoadRequest {
    world: PathBuf,
    overrides: Overrides,
    out: PathBuf,
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
    dry_run: bool,
}

fn run_load(req: LoadRequest, saves: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let world = assets::resolve_world(&req.world, saves);
    if !world.is_dir() {
        return Err(LoadError::MissingWorld(world).into());
    }
    let mut options = config::load_options(req.config.as_deref())?;
    req.overrides.apply(&mut options);
    options.validate()?;

    let info = LevelInfo::read(&world).map_err(LoadError::from)?;
    log::info!(
        "world '{}' ({:?}, seed {})",
        info.name.as_deref().unwrap_or("?"),
        info.format,
        info.seed
    );
    if !has_dimension(&world, options.dimension) {
        log::warn!("{} has no {} region folder", world.display(), options.dimension);
    }

    let (center, source) = info.load_center(options.dimension, options.center);
    log::info!("load center {:?} ({:?})", center, source);
    let mut ctx = LoadContext::new(&options, BlockPos::from_f64(center), info.seed)?;
    if source == CenterSource::Player {
        ctx = ctx.with_player(center);
    }

    let root = assets::resolve_assets_root(req.assets);
    let catalog = CatalogStore::load_from_path(assets::blocks_path(&root))?;
    let layout = AtlasLayout::from_config(&catalog.atlas);
    let reader = RegionStore::open(&world, options.dimension, info.format);

    let mut outcome = load(&ctx, &catalog, &reader, layout)?;
    let atlas = AtlasImage::locate(assets::atlas_path(&root, &catalog.atlas.image), &layout);
    if req.dry_run {
        let mut scene = RecordingScene::default();
        write_scene(&mut scene, &mut outcome, &atlas, options.faster_viewport)?;
    } else {
        let mut exporter = ObjExporter::create(&req.out)?;
        write_scene(&mut exporter, &mut outcome, &atlas, options.faster_viewport)?;
        log::info!("scene written to {}", exporter.out_dir().display());
    }
    Ok(())
}

fn write_scene<S: SceneSink>(
    sink: &mut S,
    outcome: &mut LoadOutcome,
    atlas: &AtlasImage,
    viewport_hides: bool,
) -> Result<(), Box<dyn Error>> {
    commit(sink, outcome, atlas, viewport_hides)?;
    outcome.report.atlas_placeholder = atlas.placeholder;
    outcome.report.log_summary();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    let saves = assets::resolve_saves_dir(cli.saves);

    let result = match cli.command {
        Command::List => list(saves.as_deref()),
        Command::Load {
            world,
            overrides,
            out,
            assets,
            config,
            dry_run,
        } => run_load(
            LoadRequest {
                world,
                overrides,
                out,
                assets,
                config,
                dry_run,
            },
            saves.as_deref(),
        ),
    };
    if let Err(e) = &result {
        log::error!("{e}");
    }
    result
}
