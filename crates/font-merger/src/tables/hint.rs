//! TrueType hinting programs
//!
//! `fpgm`, `prep` and `cvt ` are copied from the first font only, and glyphs of
//! every later font lose their instructions (see `glyf`), so glyphs from
//! later fonts render unhinted.

use log::{debug, warn};
use read_fonts::{FontRef, types::Tag};

const HINT_TABLES: [&[u8; 4]; 3] = [b"fpgm", b"prep", b"cvt "];

fn hint_tables<'a>(font: &FontRef<'a>) -> [Option<&'a [u8]>; 3] {
    HINT_TABLES.map(|tag| font.table_data(Tag::new(tag)).map(|d| d.as_bytes()))
}

fn is_hinted(font: &FontRef) -> bool {
    hint_tables(font).iter().any(Option::is_some)
}

/// Warns when more than one font carries hinting programs and they differ.
///
/// Returns `true` when the first font's programs serve every hinted font.
pub fn check_hint_compatibility(fonts: &[FontRef]) -> bool {
    let mut hinted = fonts.iter().filter(|f| is_hinted(f));
    let Some(reference) = hinted.next().map(hint_tables) else {
        return true;
    };

    if hinted.all(|f| hint_tables(f) == reference) {
        true
    } else {
        warn!(
            "Fonts have different TrueType hinting programs; \
             glyphs from fonts after the first are merged unhinted"
        );
        false
    }
}

pub fn log_hint_info(fonts: &[FontRef]) {
    for (i, font) in fonts.iter().enumerate() {
        let [fpgm, prep, cvt] = hint_tables(font).map(|t| t.is_some());
        if fpgm || prep || cvt {
            debug!("Font {i}: fpgm={fpgm}, prep={prep}, cvt={cvt}");
        }
    }
}
