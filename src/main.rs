//! spritereel demo.
//!
//! Two modes:
//!
//! - `headless` simulates a sheet of a given size, runs a number of ticks and
//!   logs the frame rectangle drawn on every tick.
//! - `window` (needs the `raylib` feature) loads a real sprite sheet and plays
//!   it in a window.
//!
//! # Running
//!
//! ```sh
//! cargo run -- headless walk.png --width 32 --height 32 --frame-width 8 --ticks 8
//! cargo run --features raylib -- window assets/walk.png --frame-width 8
//! ```

use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use spritereel::components::animation::{AnimationOptions, Iterations, SheetAnimation};
use spritereel::loader::{AssetLoader, LoadRequest, LoadSender, LoadedBitmap};
use spritereel::manager::SpriteManager;
use spritereel::resources::assetcatalog::{Bitmap, BitmapHandle};
use spritereel::resources::engineconfig::EngineConfig;
use spritereel::systems::render::{DestRect, FrameRect, Renderer};

/// Sprite-sheet animation playground
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Simulate ticks without a window and log every drawn frame.
    Headless {
        /// Asset name to register.
        sheet: String,
        /// Simulated sheet width in pixels.
        #[arg(long, default_value_t = 32)]
        width: u32,
        /// Simulated sheet height in pixels.
        #[arg(long, default_value_t = 32)]
        height: u32,
        /// Number of update ticks to run.
        #[arg(long, default_value_t = 8)]
        ticks: u32,
        #[command(flatten)]
        anim: AnimArgs,
    },
    /// Play a sheet in a raylib window.
    #[cfg(feature = "raylib")]
    Window {
        /// Image file to load.
        sheet: PathBuf,
        #[command(flatten)]
        anim: AnimArgs,
    },
}

#[derive(Args)]
struct AnimArgs {
    /// Frame width in pixels (0 = whole sheet).
    #[arg(long, default_value_t = 0)]
    frame_width: i32,
    /// Frame height in pixels (0 = whole sheet).
    #[arg(long, default_value_t = 0)]
    frame_height: i32,
    /// ltr, rtl, ttb or btt.
    #[arg(long, default_value = "ltr")]
    direction: String,
    /// Bounce instead of wrapping.
    #[arg(long)]
    alternate: bool,
    /// Ticks between frame changes (defaults to the config value).
    #[arg(long)]
    frames_per_step: Option<i64>,
    /// Stop after this many loops.
    #[arg(long)]
    iterations: Option<u32>,
}

impl AnimArgs {
    fn build(&self, default_frames_per_step: u32) -> spritereel::error::Result<SheetAnimation> {
        let options = AnimationOptions {
            s_width: self.frame_width,
            s_height: self.frame_height,
            direction: Some(self.direction.clone()),
            alternate: self.alternate,
            frames_per_step: self.frames_per_step,
            iterations: self.iterations.map(Iterations::limited),
            ..Default::default()
        };
        SheetAnimation::from_options(&options, default_frames_per_step)
    }
}

/// Pretends every asset decodes to the same fixed size.
struct FixedSizeLoader {
    width: u32,
    height: u32,
    next: u64,
}

impl AssetLoader for FixedSizeLoader {
    fn request(&mut self, request: LoadRequest, completions: &LoadSender) {
        self.next += 1;
        completions.loaded(
            request.slot,
            LoadedBitmap {
                handle: BitmapHandle(self.next),
                width: self.width,
                height: self.height,
            },
        );
    }
}

/// Logs blits instead of drawing them.
struct LogRenderer {
    tick: u32,
}

impl Renderer for LogRenderer {
    fn blit_region(&mut self, bitmap: &Bitmap, src: FrameRect, dst: DestRect) -> bool {
        info!(
            "tick {:>3}: {} src=({}, {}, {}x{}) dst=({}, {})",
            self.tick, bitmap.label, src.x, src.y, src.width, src.height, dst.x, dst.y
        );
        true
    }

    fn blit(&mut self, bitmap: &Bitmap, x: f32, y: f32) -> bool {
        info!("tick {:>3}: {} whole at ({}, {})", self.tick, bitmap.label, x, y);
        true
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                log::warn!("{}, using defaults", e);
            }
            config
        }
        None => EngineConfig::new(),
    };

    let result = match cli.mode {
        Mode::Headless {
            sheet,
            width,
            height,
            ticks,
            anim,
        } => run_headless(config, &sheet, width, height, ticks, &anim),
        #[cfg(feature = "raylib")]
        Mode::Window { sheet, anim } => run_window(config, &sheet, &anim),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_headless(
    config: EngineConfig,
    sheet: &str,
    width: u32,
    height: u32,
    ticks: u32,
    anim: &AnimArgs,
) -> spritereel::error::Result<()> {
    let animation = anim.build(config.frames_per_step)?;
    let mut manager = SpriteManager::with_config(config);
    manager.register(sheet);
    let mut loader = FixedSizeLoader {
        width,
        height,
        next: 0,
    };
    manager.load_all(&mut loader, |summary| {
        info!("{} of {} sheets ready", summary.loaded, summary.total)
    });

    let instance = manager.create_animated_instance(sheet, animation)?;
    let mut renderer = LogRenderer { tick: 0 };
    for tick in 0..ticks {
        renderer.tick = tick;
        manager.draw_image(&mut renderer, &instance, 0.0, 0.0)?;
        manager.update();
        if manager.animation_destroyed(&instance) {
            info!("animation finished at tick {}", tick);
            break;
        }
    }
    manager.destroy_instance(&instance);
    Ok(())
}

#[cfg(feature = "raylib")]
fn run_window(
    config: EngineConfig,
    sheet: &std::path::Path,
    anim: &AnimArgs,
) -> spritereel::error::Result<()> {
    use raylib::prelude::*;
    use spritereel::error::SpriteError;
    use spritereel::raylib_backend::{RaylibLoader, RaylibRenderer};
    use spritereel::resources::texturestore::TextureStore;

    let animation = anim.build(config.frames_per_step)?;
    let (mut rl, thread) = raylib::init().size(640, 360).title("spritereel").build();
    rl.set_target_fps(60);

    let name = sheet.to_string_lossy().into_owned();
    let mut manager = SpriteManager::with_config(config);
    manager.register(name.as_str());
    let mut textures = TextureStore::new();
    {
        let mut loader = RaylibLoader::new(&mut rl, &thread, &mut textures);
        manager.request_all(&mut loader);
    }
    if !manager.all_loaded() {
        return Err(SpriteError::NotFound(format!("could not load {}", name)));
    }

    let instance = manager.create_animated_instance(&name, animation)?;
    while !rl.window_should_close() {
        manager.update();
        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::DARKGRAY);
        let mut renderer = RaylibRenderer::new(&mut d, &textures);
        manager.draw_image(&mut renderer, &instance, 16.0, 16.0)?;
    }
    Ok(())
}
