//! glyf table merging
//!
//! Glyphs are concatenated in merge order. Composite components are shifted to
//! the merged glyph ids of their own font. Glyphs from every font but the
//! first lose their instructions; only the first font's `fpgm`/`cvt ` survive.

use std::collections::HashSet;

use log::warn;
use read_fonts::{TableProvider, tables::glyf::Glyph as ReadGlyph, types::GlyphId};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{Bbox, Component, CompositeGlyph, Glyf, GlyfLocaBuilder, Glyph, SimpleGlyph},
        loca::{Loca, LocaFormat},
    },
};

use crate::{
    Result,
    context::{GidRemap, MergeContext},
};

pub fn merge_glyf(ctx: &MergeContext) -> Result<(Glyf, Loca, LocaFormat)> {
    let mut glyphs: Vec<Glyph> = Vec::with_capacity(usize::from(ctx.total_glyphs()));

    for (font_idx, font, remap) in ctx.fonts_with_remap() {
        let glyf = font.glyf()?;
        let loca = font.loca(None)?;

        for gid in 0..remap.count() {
            let glyph = match loca.get_glyf(GlyphId::from(gid), &glyf) {
                Ok(Some(glyph)) if font_idx.is_first() => glyph.to_owned_table(),
                Ok(Some(glyph)) => convert_glyph(&glyph, remap),
                Ok(None) => Glyph::Empty,
                Err(e) => {
                    warn!("{font_idx}: glyph {gid} is unreadable ({e}); left empty");
                    Glyph::Empty
                }
            };
            glyphs.push(glyph);
        }
    }

    drop_composites_of_empty_glyphs(&mut glyphs);

    let mut builder = GlyfLocaBuilder::new();
    for (gid, glyph) in glyphs.iter().enumerate() {
        if let Err(e) = builder.add_glyph(glyph) {
            warn!("Merged glyph {gid} failed to compile ({e}); left empty");
            builder.add_glyph(&Glyph::Empty)?;
        }
    }

    Ok(builder.build())
}

/// Rebuilds a glyph from a later font: no instructions, components shifted.
fn convert_glyph(glyph: &ReadGlyph, remap: GidRemap) -> Glyph {
    match glyph {
        ReadGlyph::Simple(simple) => {
            let mut simple: SimpleGlyph = simple.to_owned_table();
            simple.instructions.clear();
            Glyph::Simple(simple)
        }
        ReadGlyph::Composite(composite) => {
            let bbox = Bbox {
                x_min: composite.x_min(),
                y_min: composite.y_min(),
                x_max: composite.x_max(),
                y_max: composite.y_max(),
            };
            let mut components = composite.components().map(|c| Component {
                glyph: remap.shift(c.glyph),
                anchor: c.anchor,
                flags: c.flags.into(),
                transform: c.transform,
            });

            let Some(first) = components.next() else {
                return Glyph::Empty;
            };
            let mut merged = CompositeGlyph::new(first, bbox);
            for component in components {
                merged.add_component(component, bbox);
            }
            Glyph::Composite(merged)
        }
    }
}

/// Empties composites that reference empty glyphs, which OTS rejects.
///
/// Repeats until stable, since emptying one composite can orphan another.
fn drop_composites_of_empty_glyphs(glyphs: &mut [Glyph]) {
    loop {
        let empty: HashSet<u16> = glyphs
            .iter()
            .enumerate()
            .filter(|(_, g)| matches!(g, Glyph::Empty))
            .map(|(gid, _)| gid as u16)
            .collect();

        let mut changed = false;
        for glyph in glyphs.iter_mut() {
            if let Glyph::Composite(composite) = glyph
                && composite.components().iter().any(|c| empty.contains(&c.glyph.to_u16()))
            {
                *glyph = Glyph::Empty;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
