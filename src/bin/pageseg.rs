//! pageseg - segment a page scan into regions and OCR them one by one
//!
//! Usage:
//!   pageseg -f scans/comber.jpg --finishtext
//!   pageseg -f scans/comber.jpg --boxes comber_boxes.json -i
//!   pageseg -f scans/comber.jpg --merge-only work/comber
//!
//! Outputs land next to the input: `<base>.hocr`, `<base>_final.jpg` and
//! `<base>_regions.jpg`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use pageseg::geometry::PivotSelection;
use pageseg::ocr::TesseractEngine;
use pageseg::segment::{BoxFileSegmenter, CommandSegmenter, Segmenter};
use pageseg::store::IntermediateStore;
use pageseg::{HocrMerger, OutputPaths, PagePipeline, Result, SegmentationConfig, SegmentationMode};

#[derive(Parser, Debug)]
#[command(name = "pageseg", version, about = "Column segmentation and region-wise OCR for page scans")]
struct Args {
    /// Input image, for example: imgs/my_image.tif
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Do not OCR what is left of the page after segmentation
    #[arg(long = "skipdefault", action = ArgAction::SetTrue)]
    skip_default: bool,

    /// Run text-line detection over what is left after the column pass
    #[arg(long = "finishtext", action = ArgAction::SetTrue)]
    finish_text: bool,

    /// OCR language (defaults to "eng")
    #[arg(short = 'l', long = "lang")]
    lang: Option<String>,

    /// Skip the binarization step
    #[arg(short = 'n', long = "nobinarize", action = ArgAction::SetTrue)]
    no_binarize: bool,

    /// Image only, no OCR (useful for planning)
    #[arg(short = 'i', long = "image", action = ArgAction::SetTrue)]
    image_only: bool,

    /// Use text-line detection instead of column detection
    #[arg(short = 't', long = "text", action = ArgAction::SetTrue)]
    text: bool,

    /// Segmenter debug output and region exports
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Margin added around each region when cropping
    #[arg(short = 'e', long)]
    edge: Option<i32>,

    /// Save the binarized image and crop from it
    #[arg(short = 's', long = "save", action = ArgAction::SetTrue)]
    save: bool,

    /// Fill in regions for page area no column covers
    #[arg(short = 'm', long = "missing", action = ArgAction::SetTrue)]
    missing: bool,

    /// Minimum width for a region
    #[arg(long = "minwidth")]
    min_width: Option<i32>,

    /// Minimum height for a region
    #[arg(long = "minheight")]
    min_height: Option<i32>,

    /// OCR time budget per call, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Native segmentation helper
    #[arg(long, default_value = "leptseg")]
    segmenter: PathBuf,

    /// Read precomputed boxes from a JSON file instead of running a segmenter
    #[arg(long)]
    boxes: Option<PathBuf>,

    /// Tesseract binary
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// Keep per-region crops and fragments in this directory
    #[arg(long)]
    keep: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for gap-filling pivot selection
    #[arg(long)]
    seed: Option<u64>,

    /// Merge fragments kept in this directory and exit
    #[arg(long = "merge-only")]
    merge_only: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> Result<SegmentationConfig> {
        let mut config = match &self.config {
            Some(path) => SegmentationConfig::from_json_file(path)?,
            None => SegmentationConfig::new(),
        };

        if self.text {
            config.mode = SegmentationMode::Text;
        }
        if self.no_binarize {
            config.binarize = false;
        }
        config.debug |= self.debug;
        config.save_binarized |= self.save;
        config.fill_gaps |= self.missing;
        config.image_only |= self.image_only;
        config.finish_text |= self.finish_text;
        config.skip_default |= self.skip_default;
        if let Some(lang) = &self.lang {
            config.language = lang.clone();
        }
        if let Some(edge) = self.edge {
            config.edge = edge;
        }
        if let Some(min_width) = self.min_width {
            config.min_width = min_width;
        }
        if let Some(min_height) = self.min_height {
            config.min_height = min_height;
        }
        if let Some(timeout) = self.timeout {
            config.ocr_timeout_secs = timeout;
        }
        if let Some(seed) = self.seed {
            config.pivot = PivotSelection::Seeded(seed);
        }
        if let Some(dir) = &self.keep {
            config.intermediates_dir = Some(dir.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn merge_only(input: &Path, dir: &Path, outputs: &OutputPaths) -> Result<()> {
    let (width, height) = image::image_dimensions(input)?;
    let store = IntermediateStore::open(dir)?;
    let fragments = store.load_all()?;
    log::info!("merging {} kept fragments from {}", fragments.len(), dir.display());
    let merged = HocrMerger::new(input.to_string_lossy(), width, height).merge(&fragments)?;
    std::fs::write(&outputs.hocr, merged)?;
    println!("{}", outputs.hocr.display());
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let outputs = OutputPaths::for_input(&args.file);
    if let Some(dir) = &args.merge_only {
        return merge_only(&args.file, dir, &outputs);
    }

    let config = args.to_config()?;
    let segmenter: Box<dyn Segmenter> = match &args.boxes {
        Some(path) => Box::new(BoxFileSegmenter::new(path)),
        None => Box::new(CommandSegmenter::new(&args.segmenter)),
    };
    let engine = Box::new(TesseractEngine::new(&args.tesseract, config.language.clone()));

    let report = PagePipeline::new(config, segmenter, engine).run(&args.file, &outputs)?;

    println!(
        "{:?} segmentation: {} regions ({} primary), {} processed, {} suppressed, {} OCR failures",
        report.mode, report.regions, report.primary, report.processed, report.suppressed, report.failed
    );
    if report.fragments > 0 {
        println!("{}", outputs.hocr.display());
    }
    println!("{}", outputs.final_image.display());
    println!("{}", outputs.regions_image.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
