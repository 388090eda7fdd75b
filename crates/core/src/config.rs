//! Configuration constants for Notobuilder builds.

/// Units per em every contributing font is scaled to before merging.
pub const TARGET_UPM: u16 = 1000;

/// Family name used when none is requested.
pub const DEFAULT_FAMILY_NAME: &str = "Personal Noto";

/// Directory under the output root that receives finished fonts.
pub const OUTPUT_DIR_NAME: &str = "Custom_Fonts";

/// Directory under the output directory for per-style intermediates.
pub const WORK_DIR_NAME: &str = ".intermediate";

/// Directory inside a family's cache folder that holds its instance fonts.
pub const INSTANCE_DIR_NAME: &str = "instance_ttf";

/// Sidecar file recording the last-synced change token of a family.
pub const TOKEN_FILE_NAME: &str = "sha.md";

/// Listing API of the Noto font repositories.
pub const API_BASE_URL: &str = "https://api.github.com/repos/notofonts";

/// Branch the listing API is queried at.
pub const SOURCE_BRANCH: &str = "master";

/// Parent of the instance directory in a repository, without the hinting segment.
pub const FONTS_TTF_PATH: &str = "fonts/ttf";

/// User agent sent to the listing API, which rejects anonymous clients.
pub const USER_AGENT: &str = concat!("notobuilder/", env!("CARGO_PKG_VERSION"));

/// Suffix of glyph-swapped copies written next to their source.
pub const SWAP_FILE_SUFFIX: &str = "swap";

/// Glyph-name suffix of alternate I/J shapes.
pub const ALT_IJ_SUFFIX: &str = "alt";

/// Pseudo-preset that disables pre-subsetting.
pub const FULL_PRESET: &str = "Full";
