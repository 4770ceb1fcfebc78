//! The page driver: segment, sequence, crop, blank, recognize, merge.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{SegmentationConfig, SegmentationMode};
use crate::debug::{DebugOptions, DebugVisualizer, RegionOutline, RegionRole};
use crate::error::Result;
use crate::hocr::{translate_fragment, Fragment, HocrMerger};
use crate::layout::{sequence, RegionKey, SequencedRegions};
use crate::ocr::{OcrEngine, OcrRequest};
use crate::segment::Segmenter;
use crate::store::{ArtifactId, IntermediateStore};

use super::canvas::Canvas;

/// Where the outputs of one page go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Merged page hOCR, `<base>.hocr`
    pub hocr: PathBuf,
    /// Page with every processed region whitened, `<base>_final.jpg`
    pub final_image: PathBuf,
    /// Page with region outlines, `<base>_regions.jpg`
    pub regions_image: PathBuf,
    /// Region list export, `<base>_regions.json`
    pub regions_json: PathBuf,
    /// Region overlay export, `<base>_regions.svg`
    pub regions_svg: PathBuf,
}

impl OutputPaths {
    /// Outputs next to `input`, named after it without its extension.
    ///
    /// ```
    /// use std::path::Path;
    /// use pageseg::pipeline::OutputPaths;
    ///
    /// let paths = OutputPaths::for_input(Path::new("scans/comber.jpg"));
    /// assert_eq!(paths.hocr, Path::new("scans/comber.hocr"));
    /// assert_eq!(paths.final_image, Path::new("scans/comber_final.jpg"));
    /// ```
    pub fn for_input(input: &Path) -> Self {
        Self::with_base(&input.with_extension(""))
    }

    /// Outputs named `<base>.hocr`, `<base>_final.jpg` and so on.
    pub fn with_base(base: &Path) -> Self {
        let suffixed = |suffix: &str| {
            let mut name = base.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            hocr: suffixed(".hocr"),
            final_image: suffixed("_final.jpg"),
            regions_image: suffixed("_regions.jpg"),
            regions_json: suffixed("_regions.json"),
            regions_svg: suffixed("_regions.svg"),
        }
    }
}

/// What happened to one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReport {
    /// Mode of the primary pass
    pub mode: SegmentationMode,
    /// Regions seen across all passes, suppressed ones included
    pub regions: usize,
    /// Primary-pass regions (before gap filling)
    pub primary: usize,
    /// Regions suppressed during reconciliation
    pub suppressed: usize,
    /// Regions cropped and blanked
    pub processed: usize,
    /// OCR calls that failed recoverably
    pub failed: usize,
    /// Fragments merged into the page document
    pub fragments: usize,
}

/// Runs one page through segmentation, OCR and merge.
pub struct PagePipeline {
    config: SegmentationConfig,
    segmenter: Box<dyn Segmenter>,
    engine: Box<dyn OcrEngine>,
    visualizer: DebugVisualizer,
}

/// Mutable state of one run.
struct PageRun<'a> {
    pipeline: &'a PagePipeline,
    store: IntermediateStore,
    // regions seen so far per bounds, for artifact naming
    seen: HashMap<RegionKey, u32>,
    persisted: Vec<ArtifactId>,
    working: Canvas,
    regions_canvas: Canvas,
    fragments: Vec<Fragment>,
    outlines: Vec<RegionOutline>,
    report: PageReport,
}

impl PagePipeline {
    /// Create a pipeline around the given collaborators.
    pub fn new(
        config: SegmentationConfig,
        segmenter: Box<dyn Segmenter>,
        engine: Box<dyn OcrEngine>,
    ) -> Self {
        Self {
            config,
            segmenter,
            engine,
            visualizer: DebugVisualizer::new(DebugOptions::default()),
        }
    }

    /// Replace the outline style.
    pub fn with_debug_options(mut self, options: DebugOptions) -> Self {
        self.visualizer = DebugVisualizer::new(options);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Process `input` and write every output to `outputs`.
    pub fn run(&self, input: &Path, outputs: &OutputPaths) -> Result<PageReport> {
        self.config.validate()?;
        let page = Canvas::load(input)?;
        let (width, height) = (page.width(), page.height());
        log::info!(
            "segmenting {} ({}x{}) with {} segmenter, {} engine",
            input.display(),
            width,
            height,
            self.segmenter.name(),
            self.engine.name()
        );

        let store = match &self.config.intermediates_dir {
            Some(dir) => IntermediateStore::open(dir)?,
            None => IntermediateStore::temporary()?,
        };

        let mut run = PageRun {
            pipeline: self,
            store,
            seen: HashMap::new(),
            persisted: Vec::new(),
            regions_canvas: page.clone(),
            working: page,
            fragments: Vec::new(),
            outlines: Vec::new(),
            report: PageReport {
                mode: self.config.mode,
                ..PageReport::default()
            },
        };

        let primary = run.segment_pass(input, self.config.mode)?;
        run.report.primary = primary.primary;
        run.process(&primary, false)?;
        run.working.save(&outputs.final_image)?;

        if self.config.runs_fallback_passes() {
            if self.config.finish_text {
                let text = run.segment_pass(&outputs.final_image, SegmentationMode::Text)?;
                run.process(&text, true)?;
                run.working.save(&outputs.final_image)?;
            }
            if !self.config.skip_default && !self.config.image_only {
                run.recognize_remaining_page()?;
            }
        }

        if !self.config.image_only {
            let merger = HocrMerger::new(input.to_string_lossy(), width, height);
            let fragments = run.collected_fragments()?;
            run.report.fragments = fragments.len();
            std::fs::write(&outputs.hocr, merger.merge(&fragments)?)?;
        }

        run.regions_canvas.save(&outputs.regions_image)?;
        if self.config.debug {
            let json = self.visualizer.export_regions_json(&run.outlines, width, height)?;
            std::fs::write(&outputs.regions_json, json)?;
            let svg = self.visualizer.export_regions_svg(&run.outlines, width, height);
            std::fs::write(&outputs.regions_svg, svg)?;
        }

        log::info!(
            "{}: {} regions, {} processed, {} suppressed, {} failed, {} fragments",
            input.display(),
            run.report.regions,
            run.report.processed,
            run.report.suppressed,
            run.report.failed,
            run.report.fragments
        );
        Ok(run.report)
    }
}

impl<'a> PageRun<'a> {
    /// Segment `image` in `mode` and sequence the result.
    fn segment_pass(&mut self, image: &Path, mode: SegmentationMode) -> Result<SequencedRegions> {
        let pipeline = self.pipeline;
        let config = &pipeline.config;
        let flags = config.segment_flags(mode);
        let boxes = pipeline.segmenter.segment(image, &flags)?;

        if config.save_binarized {
            let mut binarized = image.as_os_str().to_os_string();
            binarized.push(".png");
            let binarized = PathBuf::from(binarized);
            if binarized.is_file() {
                log::debug!("cropping from binarized {}", binarized.display());
                self.working = Canvas::load(&binarized)?;
            }
        }

        let page = self.working.bounds();
        let sequenced = sequence(mode, &boxes, &page, &config.reconcile_options());
        log::info!(
            "{:?} segmentation of {}: {} regions ({} primary)",
            mode,
            image.display(),
            sequenced.regions.len(),
            sequenced.primary
        );
        Ok(sequenced)
    }

    /// Crop, blank, outline and recognize every live region in sequence
    /// order. With `fallback`, every region is drawn as a fallback region.
    fn process(&mut self, sequenced: &SequencedRegions, fallback: bool) -> Result<()> {
        let pipeline = self.pipeline;
        let config = &pipeline.config;
        let page = self.working.bounds();
        self.report.regions += sequenced.regions.len();

        for (idx, region) in sequenced.regions.iter().enumerate() {
            if region.suppressed {
                self.report.suppressed += 1;
                self.outlines.push(RegionOutline::new(region.rect, RegionRole::Suppressed));
                continue;
            }
            let rect = region.rect;
            let crop_rect = rect.expand(config.edge).clip(&page);
            if rect.is_degenerate() || crop_rect.is_degenerate() || !page.intersects(&rect) {
                log::debug!("skipping degenerate region {:?}", rect);
                continue;
            }
            let Some(crop) = self.working.crop(&crop_rect) else {
                continue;
            };

            let role = if !fallback && sequenced.is_primary(idx) {
                RegionRole::Primary
            } else {
                RegionRole::Fallback
            };
            let outline = RegionOutline::new(rect, role);
            self.working.blank(&rect);
            pipeline
                .visualizer
                .draw_region(self.regions_canvas.pixmap_mut(), &outline);
            self.outlines.push(outline);
            self.report.processed += 1;

            let id = self.next_artifact(RegionKey::from(rect));
            let crop_path = self.store.image_path(&id);
            crop.save(&crop_path)?;
            if config.image_only {
                continue;
            }

            let request = OcrRequest::new(&crop_path, config.ocr_timeout())
                .with_page_seg_mode(config.region_psm);
            let fragment = Fragment::new(id.key, (crop_rect.left, crop_rect.top), String::new());
            self.recognize(request, fragment, id)?;
        }
        Ok(())
    }

    /// OCR whatever is left of the page with the engine's own layout analysis.
    fn recognize_remaining_page(&mut self) -> Result<()> {
        let id = self.next_artifact(RegionKey::PAGE);
        let path = self.store.image_path(&id);
        self.working.save(&path)?;
        log::info!("recognizing remaining page content");
        let request = OcrRequest::new(&path, self.pipeline.config.ocr_timeout());
        self.recognize(request, Fragment::global(id.key, String::new()), id)
    }

    /// Artifact name for the next region with bounds `key`.
    fn next_artifact(&mut self, key: RegionKey) -> ArtifactId {
        let count = self.seen.entry(key).or_insert(0);
        let id = ArtifactId { key, seq: *count };
        *count += 1;
        id
    }

    /// Run OCR for `request` and keep the markup in `fragment`. Recoverable
    /// failures are logged and counted.
    fn recognize(
        &mut self,
        request: OcrRequest,
        mut fragment: Fragment,
        id: ArtifactId,
    ) -> Result<()> {
        match self.pipeline.engine.recognize(&request) {
            Ok(markup) => {
                if self.pipeline.config.intermediates_dir.is_some() {
                    let (dx, dy) = fragment.offset;
                    let global = translate_fragment(&markup, dx, dy)?;
                    self.store.write_fragment(&id, &global)?;
                    self.persisted.push(id);
                }
                fragment.markup = markup;
                self.fragments.push(fragment);
                Ok(())
            },
            Err(e) if e.is_recoverable() => {
                log::warn!("OCR of region {} failed: {}", fragment.key, e);
                self.report.failed += 1;
                Ok(())
            },
            Err(e) => Err(e),
        }
    }

    /// Fragments to merge: read back from disk when intermediates are kept,
    /// otherwise the in-memory results.
    fn collected_fragments(&mut self) -> Result<Vec<Fragment>> {
        if self.pipeline.config.intermediates_dir.is_some() {
            self.store.load_fragments(&self.persisted)
        } else {
            Ok(std::mem::take(&mut self.fragments))
        }
    }
}
