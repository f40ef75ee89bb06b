//! FoldRec Core Library
//!
//! Coordinate axes, symmetric interaction lookup, value-to-color mapping,
//! brush zooming and the rotated triangle projection for chromosome
//! contact-map viewers. Everything here is pure computation; painting lives
//! in `foldrec-render`.

pub mod types;
pub mod axis;
pub mod index;
pub mod color;
pub mod scale;
pub mod brush;
pub mod triangle;
pub mod view;
pub mod io;

// Re-export commonly used types and functions
pub use types::{GenomicPos, GenomicRange, InteractionRecord, ModeProfile, RangeError, ValueMode};
pub use axis::{compute_axis, compute_sparse_axis, compute_ticks, format_tick_label, TickSet, ViewAxis};
pub use index::{CellLookup, InteractionIndex, MergedIndex};
pub use color::{color_for, ColorScaleRange, Rgb};
pub use scale::{BandScale, LinearScale};
pub use brush::{BrushOutcome, BrushState, ZoomController};
pub use triangle::{TriangleHalf, TriangleLayout, TrianglePicker, TriangleShading, TriangleSubRegion};
pub use view::{FetchRequest, RequestSequencer, ViewContext};

/// Version information for the FoldRec core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
