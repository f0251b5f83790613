use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use folio_viewer::pdfium::PdfiumLoader;
use folio_viewer::{
    load_document, Canvas, Command, ControlState, ControlSurface, JsonFileStore, LayoutMode,
    Layout, NavigationStore, Navigator, RenderOutcome, ScrollLayout, ViewerConfig,
};

#[derive(Debug, Parser)]
#[command(name = "folio", about = "Page through a PDF from the terminal")]
struct Args {
    /// PDF to open. Overrides the config file.
    document: Option<String>,

    /// JSON viewer config
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1440)]
    screen_width: u32,

    #[arg(long, default_value_t = 1200.0)]
    container_width: f32,

    #[arg(long, default_value_t = 900.0)]
    container_height: f32,

    #[arg(long, default_value_t = 1.0)]
    device_pixel_ratio: f32,

    /// Where the rendered page is written
    #[arg(long, default_value = "folio-page.png")]
    output: PathBuf,
}

const DEFAULT_STATE_PATH: &str = ".folio-state.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("folio_viewer=debug,info")
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(document) = &args.document {
        config.document = document.clone();
    }

    let state_path = config
        .state_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
    let store = NavigationStore::new(Arc::new(JsonFileStore::new(state_path)));
    let controls: Arc<dyn ControlSurface> = Arc::new(TerminalControls {
        document: config.document.clone(),
    });
    let loader = PdfiumLoader::new()?;

    let loaded = load_document(&loader, store.clone(), controls, args.screen_width, config).await?;

    match loaded.mode() {
        LayoutMode::Scroll => {
            let mut pages: Vec<(u32, Canvas)> = Vec::new();
            let layout = ScrollLayout::new(args.container_width, args.device_pixel_ratio);
            let report = loaded.render_scroll(&mut pages, layout).await;
            // The notice is shown once; a terminal has no close button.
            store.dismiss_notification();
            for (page, canvas) in &pages {
                if report.rendered.contains(page) {
                    save_png(canvas, &numbered(&args.output, *page))?;
                }
            }
            Ok(())
        }
        LayoutMode::Paged => {
            let layout = Layout::new(
                args.container_width,
                args.container_height,
                args.screen_width,
            );
            let navigator = loaded.start_paged(Canvas::new(), layout).await;
            save_current(&navigator, &args.output).await?;
            run_prompt(&navigator, &args.output).await
        }
    }
}

/// One command per line: n/p/h, g <page>, + - 0, d, resize <w> <h> <screen>, q.
async fn run_prompt(navigator: &Navigator<Canvas>, output: &Path) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            continue;
        };

        let outcome: Option<RenderOutcome> = match head {
            "q" | "quit" => break,
            "n" => navigator.execute(Command::Next).await,
            "p" => navigator.execute(Command::Prev).await,
            "h" => navigator.execute(Command::Home).await,
            "0" => navigator.execute(Command::ZoomReset).await,
            "d" => navigator.execute(Command::Download).await,
            "g" => {
                let entry = words.next().unwrap_or_default();
                match navigator.go_to_entry(entry).await {
                    Ok(outcome) => Some(outcome),
                    Err(err) => {
                        println!("{err}; still on page {}", navigator.current_page());
                        None
                    }
                }
            }
            "resize" => {
                match parse_resize(words) {
                    Some((width, height, screen)) => {
                        navigator.resize(Layout::new(width, height, screen)).await
                    }
                    _ => {
                        println!("usage: resize <width> <height> <screen-width>");
                        None
                    }
                }
            }
            key => match Command::from_key(key) {
                Some(command) => navigator.execute(command).await,
                None => {
                    println!("unknown command {key:?}");
                    None
                }
            },
        };

        if outcome.is_some() {
            save_current(navigator, output).await?;
        }
    }

    Ok(())
}

/// `<width> <height> <screen-width>`; sizes must be positive and the screen
/// width a whole number of pixels.
fn parse_resize<'a>(mut words: impl Iterator<Item = &'a str>) -> Option<(f32, f32, u32)> {
    let width = words.next()?.parse::<f32>().ok()?;
    let height = words.next()?.parse::<f32>().ok()?;
    let screen = words.next()?.parse::<u32>().ok()?;
    let valid = width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0;
    (valid && screen > 0).then_some((width, height, screen))
}

async fn save_current(navigator: &Navigator<Canvas>, output: &Path) -> Result<()> {
    let canvas = navigator.scheduler().surface().await.clone();
    save_png(&canvas, output)
}

fn save_png(canvas: &Canvas, path: &Path) -> Result<()> {
    let pixels = canvas.pixels().to_vec();
    let image = image::RgbaImage::from_raw(canvas.width(), canvas.height(), pixels)
        .context("Failed to create image from surface")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn numbered(output: &Path, page: u32) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("folio-page");
    output.with_file_name(format!("{stem}-{page}.png"))
}

struct TerminalControls {
    document: String,
}

impl ControlSurface for TerminalControls {
    fn show_progress(&self, loaded: u64, total: u64) {
        tracing::debug!(loaded, total, "loading");
    }

    fn show_load_error(&self, message: &str) {
        eprintln!("{message}");
    }

    fn set_page_count(&self, total: u32) {
        println!("{total} pages");
    }

    fn set_page_indicator(&self, page: u32) {
        println!("page {page}");
    }

    fn set_controls(&self, controls: ControlState) {
        tracing::debug!(?controls, "controls");
    }

    fn show_home_hint(&self) {
        println!("tip: press h to jump back to the first page");
    }

    fn show_notification(&self) {
        println!("best viewed on a larger screen");
    }

    fn download(&self) {
        println!("download: {}", self.document);
    }
}
