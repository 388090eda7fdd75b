//! Small TrueType fonts for tests.

use font_types::{FWord, Fixed, LongDateTime, UfWord};
use notobuilder_font_ops::{NameEntry, build_name_table};
use read_fonts::types::GlyphId;
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Contour, CurvePoint, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        os2::Os2,
        post::Post,
    },
};

/// Glyph names with the codepoints mapped to them.
pub(crate) struct TestFont {
    family: String,
    style: String,
    units_per_em: u16,
    glyphs: Vec<(String, Vec<u32>)>,
}

impl TestFont {
    /// A font with `.notdef` as its first glyph.
    pub(crate) fn new(family: &str, style: &str) -> Self {
        Self {
            family: family.to_string(),
            style: style.to_string(),
            units_per_em: 1000,
            glyphs: vec![(".notdef".to_string(), Vec::new())],
        }
    }

    pub(crate) fn glyph(mut self, name: &str, codepoints: &[u32]) -> Self {
        self.glyphs.push((name.to_string(), codepoints.to_vec()));
        self
    }

    /// One glyph per character, named `uniXXXX`.
    pub(crate) fn chars(mut self, text: &str) -> Self {
        for c in text.chars() {
            self = self.glyph(&format!("uni{:04X}", u32::from(c)), &[u32::from(c)]);
        }
        self
    }

    pub(crate) fn units_per_em(mut self, upm: u16) -> Self {
        self.units_per_em = upm;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let count = self.glyphs.len();
        let mut glyf_builder = GlyfLocaBuilder::new();
        for _ in 0..count {
            let contour: Contour = vec![
                CurvePoint::on_curve(50, 0),
                CurvePoint::on_curve(450, 0),
                CurvePoint::on_curve(450, 700),
                CurvePoint::on_curve(50, 700),
            ]
            .into();
            let glyph = SimpleGlyph {
                bbox: Bbox { x_min: 50, y_min: 0, x_max: 450, y_max: 700 },
                contours: vec![contour],
                instructions: Vec::new(),
            };
            glyf_builder.add_glyph(&Glyph::Simple(glyph)).unwrap();
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let mappings = self.glyphs.iter().enumerate().flat_map(|(gid, (_, cps))| {
            cps.iter().map(move |cp| (char::from_u32(*cp).unwrap(), GlyphId::new(gid as u32)))
        });
        let cmap = Cmap::from_mappings(mappings).unwrap();

        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::empty(),
            units_per_em: self.units_per_em,
            created: LongDateTime::new(0),
            modified: LongDateTime::new(0),
            x_min: 50,
            y_min: 0,
            x_max: 450,
            y_max: 700,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        };
        let hhea = Hhea {
            ascender: FWord::new(800),
            descender: FWord::new(-200),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(500),
            min_left_side_bearing: FWord::new(50),
            min_right_side_bearing: FWord::new(50),
            x_max_extent: FWord::new(450),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: count as u16,
        };
        let hmtx = Hmtx {
            h_metrics: vec![LongMetric { advance: 500, side_bearing: 50 }; count],
            left_side_bearings: vec![],
        };
        let maxp = Maxp {
            num_glyphs: count as u16,
            max_points: Some(4),
            max_contours: Some(1),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };
        let os2 = Os2 {
            us_weight_class: 400,
            us_width_class: 5,
            s_typo_ascender: 800,
            s_typo_descender: -200,
            us_win_ascent: 800,
            us_win_descent: 200,
            ul_code_page_range_1: Some(1),
            ul_code_page_range_2: Some(0),
            sx_height: Some(500),
            s_cap_height: Some(700),
            us_default_char: Some(0),
            us_break_char: Some(0x20),
            us_max_context: Some(0),
            ..Default::default()
        };
        let post = Post::new_v2(self.glyphs.iter().map(|(name, _)| name.as_str()));
        let name = build_name_table(self.name_entries());

        let mut builder = FontBuilder::new();
        builder.add_table(&head).unwrap();
        builder.add_table(&hhea).unwrap();
        builder.add_table(&hmtx).unwrap();
        builder.add_table(&maxp).unwrap();
        builder.add_table(&os2).unwrap();
        builder.add_table(&cmap).unwrap();
        builder.add_table(&post).unwrap();
        builder.add_table(&name).unwrap();
        builder.add_table(&glyf).unwrap();
        builder.add_table(&loca).unwrap();
        builder.build()
    }

    fn name_entries(&self) -> Vec<NameEntry> {
        let base = NameEntry {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x409,
            name_id: 1,
            value: self.family.clone(),
        };
        let ps_name = format!("{}-{}", self.family.replace(' ', ""), self.style.replace(' ', ""));
        vec![
            base.sibling(2, &self.style),
            base.sibling(3, format!("2.013;GOOG;{ps_name}")),
            base.sibling(4, format!("{} {}", self.family, self.style)),
            base.sibling(6, ps_name),
            base,
        ]
    }
}
