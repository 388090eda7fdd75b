//! WOFF2 conversion with automatic problematic glyph handling.
//!
//! Fonts mapping one of [`PROBLEMATIC_CODEPOINTS`] are first re-subset
//! without those codepoints, then Brotli-compressed into WOFF2.
//!
//! # Example
//!
//! ```no_run
//! use notobuilder_font_woff2::convert_to_woff2;
//!
//! let ttf_data: &[u8] = &[];
//! let woff2 = convert_to_woff2(ttf_data).unwrap();
//! ```

use anyhow::{Context, Result, bail};
use log::debug;
use notobuilder_font_ops::unicode_mappings;
use notobuilder_font_subsetter::Subsetter;
use read_fonts::FontRef;
use ttf2woff2::BrotliQuality;

/// Codepoints known to cause WOFF2 OTS validation errors.
///
/// U+F8FF (Apple logo) references `.notdef` as a composite component,
/// which Chrome's OTS parser rejects during WOFF2 decompression.
pub const PROBLEMATIC_CODEPOINTS: &[u32] = &[0xF8FF];

/// Subsets font data excluding problematic codepoints for WOFF2 conversion.
///
/// Returns `None` when the font maps none of [`PROBLEMATIC_CODEPOINTS`].
pub fn subset_for_woff2(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let codepoints = unicode_mappings(&font)?;

    if codepoints.is_empty() {
        bail!("No valid codepoints found in font");
    }
    if !codepoints.keys().any(|cp| PROBLEMATIC_CODEPOINTS.contains(cp)) {
        return Ok(None);
    }

    debug!("Dropping {} problematic codepoint(s) before WOFF2 encoding", PROBLEMATIC_CODEPOINTS.len());
    let kept = codepoints.into_keys().filter(|cp| !PROBLEMATIC_CODEPOINTS.contains(cp));
    Subsetter::new()
        .with_codepoints(kept)
        .retain_glyph_names(true)
        .keep_name_table(true)
        .subset(data)
        .map(Some)
}

/// Converts TTF data to WOFF2.
pub fn convert_to_woff2(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned = subset_for_woff2(data)?;
    let ttf = cleaned.as_deref().unwrap_or(data);
    ttf2woff2::encode(ttf, BrotliQuality::default())
        .map_err(|e| anyhow::anyhow!("WOFF2 encoding failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problematic_codepoints() {
        assert!(PROBLEMATIC_CODEPOINTS.contains(&0xF8FF));
    }

    #[test]
    fn test_invalid_font_rejected() {
        assert!(convert_to_woff2(b"not a font").is_err());
    }
}
