//! Configuration for page segmentation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::PivotSelection;
use crate::layout::ReconcileOptions;
use crate::segment::SegmentFlags;

/// What the segmenter is asked to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    /// Column blocks, reconciled against each other
    #[default]
    Columns,
    /// Individual text lines, taken as they come
    Text,
}

/// Page segmentation configuration.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Segmentation mode of the primary pass.
    pub mode: SegmentationMode,

    /// Binarize the page before segmenting.
    pub binarize: bool,

    /// Ask the segmenter for its own debug output, and export the region
    /// list alongside the outline image.
    pub debug: bool,

    /// Have the segmenter persist its binarized image as `<input>.png` and
    /// crop regions from it.
    pub save_binarized: bool,

    /// Synthesize regions for page area no column claims.
    pub fill_gaps: bool,

    /// Minimum width a shrunk region must keep.
    pub min_width: i32,

    /// Minimum height, passed to the segmenter.
    pub min_height: i32,

    /// Margin in pixels added around each region when cropping.
    pub edge: i32,

    /// Only blank and outline regions, no OCR.
    pub image_only: bool,

    /// Run a text-mode pass over whatever the column pass left.
    pub finish_text: bool,

    /// Skip the whole-page OCR of the remaining image.
    pub skip_default: bool,

    /// OCR language.
    pub language: String,

    /// Per-invocation OCR time budget in seconds.
    pub ocr_timeout_secs: u64,

    /// Page segmentation mode passed to the OCR engine for region crops.
    pub region_psm: u32,

    /// Pivot rule for gap filling.
    pub pivot: PivotSelection,

    /// Persist per-region crops and fragments here.
    pub intermediates_dir: Option<PathBuf>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            mode: SegmentationMode::Columns,
            binarize: true,
            debug: false,
            save_binarized: false,
            fill_gaps: false,
            min_width: 50,
            min_height: 10,
            edge: 5,
            image_only: false,
            finish_text: false,
            skip_default: false,
            language: "eng".to_string(),
            ocr_timeout_secs: 300,
            region_psm: 6,
            pivot: PivotSelection::Random,
            intermediates_dir: None,
        }
    }

    /// Load a configuration from a JSON file. Missing fields keep their
    /// defaults; the result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: SegmentationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Set the segmentation mode.
    pub fn with_mode(mut self, mode: SegmentationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable binarization.
    pub fn with_binarize(mut self, enable: bool) -> Self {
        self.binarize = enable;
        self
    }

    /// Enable debug output.
    pub fn with_debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Crop from the segmenter's binarized image.
    pub fn with_save_binarized(mut self, enable: bool) -> Self {
        self.save_binarized = enable;
        self
    }

    /// Enable gap filling.
    pub fn with_fill_gaps(mut self, enable: bool) -> Self {
        self.fill_gaps = enable;
        self
    }

    /// Set the width tolerance.
    pub fn with_min_width(mut self, min_width: i32) -> Self {
        self.min_width = min_width;
        self
    }

    /// Set the height tolerance.
    pub fn with_min_height(mut self, min_height: i32) -> Self {
        self.min_height = min_height;
        self
    }

    /// Set the crop margin.
    pub fn with_edge(mut self, edge: i32) -> Self {
        self.edge = edge;
        self
    }

    /// Skip OCR entirely.
    pub fn with_image_only(mut self, enable: bool) -> Self {
        self.image_only = enable;
        self
    }

    /// Enable the text-mode fallback pass.
    pub fn with_finish_text(mut self, enable: bool) -> Self {
        self.finish_text = enable;
        self
    }

    /// Skip the whole-page fallback OCR.
    pub fn with_skip_default(mut self, enable: bool) -> Self {
        self.skip_default = enable;
        self
    }

    /// Set the OCR language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the OCR time budget.
    pub fn with_ocr_timeout_secs(mut self, seconds: u64) -> Self {
        self.ocr_timeout_secs = seconds;
        self
    }

    /// Set the pivot rule for gap filling.
    pub fn with_pivot(mut self, pivot: PivotSelection) -> Self {
        self.pivot = pivot;
        self
    }

    /// Persist intermediates under `dir`.
    pub fn with_intermediates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.intermediates_dir = Some(dir.into());
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.min_width < 0 {
            return Err(Error::InvalidConfig(format!(
                "min_width must be non-negative, got {}",
                self.min_width
            )));
        }
        if self.min_height < 0 {
            return Err(Error::InvalidConfig(format!(
                "min_height must be non-negative, got {}",
                self.min_height
            )));
        }
        if self.edge < 0 {
            return Err(Error::InvalidConfig(format!("edge must be non-negative, got {}", self.edge)));
        }
        if self.ocr_timeout_secs == 0 {
            return Err(Error::InvalidConfig("ocr_timeout_secs must be positive".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(Error::InvalidConfig("language must not be empty".to_string()));
        }
        Ok(())
    }

    /// OCR time budget as a duration.
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    /// Flags for a segmenter call in `mode`.
    pub fn segment_flags(&self, mode: SegmentationMode) -> SegmentFlags {
        SegmentFlags {
            binarize: self.binarize,
            columns: mode == SegmentationMode::Columns,
            debug: self.debug,
            save_binarized: self.save_binarized,
            min_width: self.min_width,
            min_height: self.min_height,
        }
    }

    /// Reconciliation options derived from this configuration.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            min_width: self.min_width,
            min_height: self.min_height,
            fill_gaps: self.fill_gaps,
            pivot: self.pivot,
        }
    }

    /// Whether the text-mode and whole-page fallback passes may run.
    pub fn runs_fallback_passes(&self) -> bool {
        self.mode == SegmentationMode::Columns && !self.fill_gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SegmentationConfig::default();
        assert_eq!(config.mode, SegmentationMode::Columns);
        assert!(config.binarize);
        assert_eq!(config.min_width, 50);
        assert_eq!(config.min_height, 10);
        assert_eq!(config.edge, 5);
        assert_eq!(config.language, "eng");
        assert_eq!(config.ocr_timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SegmentationConfig::new()
            .with_mode(SegmentationMode::Text)
            .with_binarize(false)
            .with_min_width(20)
            .with_edge(0)
            .with_language("deu")
            .with_pivot(PivotSelection::Seeded(3));
        assert_eq!(config.mode, SegmentationMode::Text);
        assert!(!config.binarize);
        assert_eq!(config.reconcile_options().min_width, 20);
        assert_eq!(config.reconcile_options().pivot, PivotSelection::Seeded(3));
        assert!(!config.segment_flags(SegmentationMode::Text).columns);
        assert!(config.segment_flags(SegmentationMode::Columns).columns);
        assert!(!config.runs_fallback_passes());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SegmentationConfig::new().with_min_width(-1).validate().is_err());
        assert!(SegmentationConfig::new().with_min_height(-1).validate().is_err());
        assert!(SegmentationConfig::new().with_edge(-5).validate().is_err());
        assert!(SegmentationConfig::new().with_ocr_timeout_secs(0).validate().is_err());
        assert!(SegmentationConfig::new().with_language(" ").validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SegmentationConfig =
            serde_json::from_str(r#"{"mode": "text", "min_width": 30, "pivot": "smallest_area"}"#)
                .unwrap();
        assert_eq!(config.mode, SegmentationMode::Text);
        assert_eq!(config.min_width, 30);
        assert_eq!(config.pivot, PivotSelection::SmallestArea);
        assert_eq!(config.edge, 5);
        assert!(config.binarize);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fill_gaps": true, "pivot": {{"seeded": 9}}}}"#).unwrap();
        let config = SegmentationConfig::from_json_file(file.path()).unwrap();
        assert!(config.fill_gaps);
        assert_eq!(config.pivot, PivotSelection::Seeded(9));
    }

    #[test]
    fn test_from_json_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"edge": -2}}"#).unwrap();
        let err = SegmentationConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
