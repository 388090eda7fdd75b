//! Notobuilder Core - assembles one custom font family out of the Noto
//! families covering the requested scripts.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod io;
pub mod merge;
pub mod naming;
pub mod pipeline;
pub mod planner;
pub mod rename;
pub mod request;
pub mod styles;
pub mod swap;

#[cfg(test)]
mod test_fonts;

pub use cache::{GithubFetcher, SourceCache, SourceFetcher};
pub use catalog::{Catalog, Preset};
pub use merge::{MergeEngine, output_file_name};
pub use naming::{FamilyName, NameResolver, ResolvedFamily};
pub use notobuilder_font_metadata::{FontVersion, VerticalMetrics};
pub use pipeline::{BuildReport, Notobuilder};
pub use planner::{GlyphPlan, RemovalRegistry, ReportedCodepoints, SubsetPlanner, claim_codepoints};
pub use rename::{Renamer, is_ribbi, style_name};
pub use request::{
    BuildRequest, Contrast, OutputFormat, ScriptRequest, StyleModifier, display_family_name,
};
pub use styles::{StyleKey, StyleSelector, Weight, Width};
pub use swap::{FigureStyle, GlyphSwapper, SwapRequest};
