//! Page processing pipeline.
//!
//! ```text
//! page image
//!     ↓
//! [Segmenter] (raw boxes)
//!     ↓
//! [layout] (reconciled, sequenced regions)
//!     ↓
//! [Canvas] crop + blank, [DebugVisualizer] outline
//!     ↓
//! [OcrEngine] (one fragment per region)
//!     ↓
//! [HocrMerger] (page document)
//! ```

mod canvas;
mod page;

pub use canvas::Canvas;
pub use page::{OutputPaths, PagePipeline, PageReport};
