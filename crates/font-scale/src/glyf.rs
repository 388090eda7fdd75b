//! glyf outline scaling

use anyhow::{Context, Result};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{self as read_glyf, CurvePoint},
    types::GlyphId,
};
use write_fonts::tables::{
    glyf::{Anchor, Bbox, Component, CompositeGlyph, Contour, Glyf, GlyfLocaBuilder, Glyph, SimpleGlyph},
    loca::{Loca, LocaFormat},
};

use crate::Scale;

pub(crate) fn scale_glyf(font: &FontRef, scale: Scale) -> Result<(Glyf, Loca, LocaFormat)> {
    let glyf = font.glyf().context("Font has no glyf table")?;
    let loca = font.loca(None).context("Font has no loca table")?;

    let mut builder = GlyfLocaBuilder::new();
    for gid in 0..loca.len() {
        let glyph = loca
            .get_glyf(GlyphId::new(gid as u32), &glyf)
            .with_context(|| format!("Failed to read glyph {gid}"))?;
        let glyph = match glyph {
            Some(read_glyf::Glyph::Simple(simple)) => {
                Glyph::Simple(scale_simple_glyph(&simple, scale))
            }
            Some(read_glyf::Glyph::Composite(composite)) => {
                scale_composite_glyph(&composite, scale)
            }
            None => Glyph::Empty,
        };
        builder
            .add_glyph(&glyph)
            .with_context(|| format!("Failed to add scaled glyph {gid}"))?;
    }

    Ok(builder.build())
}

fn scale_bbox(x_min: i16, y_min: i16, x_max: i16, y_max: i16, scale: Scale) -> Bbox {
    Bbox {
        x_min: scale.i16(x_min),
        y_min: scale.i16(y_min),
        x_max: scale.i16(x_max),
        y_max: scale.i16(y_max),
    }
}

fn scale_simple_glyph(glyph: &read_glyf::SimpleGlyph, scale: Scale) -> SimpleGlyph {
    let all_points: Vec<CurvePoint> = glyph.points().collect();
    let mut contours = Vec::new();

    let mut start = 0usize;
    for end in glyph.end_pts_of_contours() {
        let end_idx = (end.get() as usize + 1).min(all_points.len());
        let scaled: Vec<CurvePoint> = all_points[start.min(end_idx)..end_idx]
            .iter()
            .map(|p| CurvePoint::new(scale.i16(p.x), scale.i16(p.y), p.on_curve))
            .collect();
        contours.push(Contour::from(scaled));
        start = end_idx;
    }

    SimpleGlyph {
        bbox: scale_bbox(glyph.x_min(), glyph.y_min(), glyph.x_max(), glyph.y_max(), scale),
        contours,
        instructions: glyph.instructions().to_vec(),
    }
}

fn scale_composite_glyph(glyph: &read_glyf::CompositeGlyph, scale: Scale) -> Glyph {
    let bbox = scale_bbox(glyph.x_min(), glyph.y_min(), glyph.x_max(), glyph.y_max(), scale);

    let mut components = glyph.components().map(|c| Component {
        glyph: c.glyph,
        anchor: match c.anchor {
            Anchor::Offset { x, y } => Anchor::Offset { x: scale.i16(x), y: scale.i16(y) },
            point @ Anchor::Point { .. } => point,
        },
        flags: c.flags.into(),
        transform: c.transform,
    });

    let Some(first) = components.next() else {
        return Glyph::Empty;
    };
    let mut composite = CompositeGlyph::new(first, bbox);
    for component in components {
        composite.add_component(component, bbox);
    }
    Glyph::Composite(composite)
}
