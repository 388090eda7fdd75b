//! Renaming merged fonts to the requested family.

use anyhow::{Result, bail};
use log::debug;
use notobuilder_font_ops::{build_name_table, read_name_records, rewrite_font};

use crate::styles::StyleKey;

const FAMILY: u16 = 1;
const SUBFAMILY: u16 = 2;
const UNIQUE_ID: u16 = 3;
const FULL_NAME: u16 = 4;
const POSTSCRIPT_NAME: u16 = 6;
const TYPOGRAPHIC_FAMILY: u16 = 16;
const TYPOGRAPHIC_SUBFAMILY: u16 = 17;

const RIBBI: [&str; 4] = ["Regular", "Bold", "Italic", "Bold Italic"];

/// Regular, Bold, Italic and Bold Italic share one legacy family; any other
/// style gets its own.
pub fn is_ribbi(style: &str) -> bool {
    RIBBI.contains(&style)
}

fn without_spaces(s: &str) -> String {
    s.split_whitespace().collect()
}

/// `Bold` + italic gives `Bold Italic`; Regular italic is just `Italic`.
pub fn style_name(style: &StyleKey, italic: bool) -> String {
    match (style.display_name(), italic) {
        (name, false) => name,
        (name, true) if name == "Regular" => "Italic".to_string(),
        (name, true) => format!("{name} Italic"),
    }
}

pub struct Renamer<'a> {
    family: &'a str,
    style: String,
    italic: bool,
    upright: String,
}

impl<'a> Renamer<'a> {
    pub fn new(family: &'a str, style: &StyleKey, italic: bool) -> Self {
        Self { family, style: style_name(style, italic), italic, upright: style.display_name() }
    }

    /// Rewrites the family, style, full, unique and PostScript names of every
    /// platform's records for the requested family and style.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let style = self.style.as_str();
        let ribbi = is_ribbi(style);
        let ps_name = format!("{}-{}", without_spaces(self.family), without_spaces(style));
        // Non-RIBBI styles keep the width and weight in the legacy family.
        let (legacy_family, legacy_style) = if ribbi {
            (self.family.to_string(), style)
        } else {
            let style = if self.italic { "Italic" } else { "Regular" };
            (format!("{} {}", self.family, self.upright), style)
        };
        debug!("Renaming to {} {style}", self.family);

        rewrite_font(data, |font, builder| {
            let entries = read_name_records(font)?;
            if !entries.iter().any(|e| e.name_id == FAMILY) {
                bail!("Font has no family name");
            }
            let has = |name_id: u16| entries.iter().any(|e| e.name_id == name_id);
            let (has_family, has_subfamily) = (has(TYPOGRAPHIC_FAMILY), has(TYPOGRAPHIC_SUBFAMILY));

            let mut renamed = Vec::with_capacity(entries.len() + 2);
            for mut entry in entries {
                match entry.name_id {
                    FAMILY => {
                        if !ribbi && !has_family {
                            renamed.push(entry.sibling(TYPOGRAPHIC_FAMILY, self.family));
                        }
                        if !ribbi && !has_subfamily {
                            renamed.push(entry.sibling(TYPOGRAPHIC_SUBFAMILY, style));
                        }
                        entry.value = legacy_family.clone();
                    }
                    SUBFAMILY => entry.value = legacy_style.to_string(),
                    UNIQUE_ID => {
                        let value = {
                            let mut fields: Vec<&str> = entry.value.split(';').take(2).collect();
                            fields.push(&ps_name);
                            fields.join(";")
                        };
                        entry.value = value;
                    }
                    FULL_NAME => entry.value = format!("{} {style}", self.family),
                    POSTSCRIPT_NAME => entry.value = ps_name.clone(),
                    TYPOGRAPHIC_FAMILY => entry.value = self.family.to_string(),
                    TYPOGRAPHIC_SUBFAMILY => entry.value = style.to_string(),
                    _ => {}
                }
                renamed.push(entry);
            }

            builder.add_table(&build_name_table(renamed))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use read_fonts::FontRef;

    use super::*;
    use crate::{
        styles::{Weight, Width},
        test_fonts::TestFont,
    };

    fn name(data: &[u8], name_id: u16) -> Option<String> {
        let font = FontRef::new(data).unwrap();
        read_name_records(&font)
            .unwrap()
            .into_iter()
            .find(|e| e.name_id == name_id && e.platform_id == 3)
            .map(|e| e.value)
    }

    #[test]
    fn test_ribbi() {
        assert!(is_ribbi("Bold Italic"));
        assert!(!is_ribbi("Condensed Bold"));
        assert!(!is_ribbi("BoldItalic"));
    }

    #[test]
    fn test_style_name() {
        let regular = StyleKey::new(Width::Normal, Weight::Regular);
        let bold = StyleKey::new(Width::Normal, Weight::Bold);
        let condensed = StyleKey::new(Width::Condensed, Weight::Light);
        assert_eq!(style_name(&regular, false), "Regular");
        assert_eq!(style_name(&regular, true), "Italic");
        assert_eq!(style_name(&bold, true), "Bold Italic");
        assert_eq!(style_name(&condensed, true), "Condensed Light Italic");
    }

    #[test]
    fn test_rename_ribbi_style() {
        let data = TestFont::new("Noto Sans", "Bold").build();
        let bold = StyleKey::new(Width::Normal, Weight::Bold);
        let renamed = Renamer::new("Personal Noto", &bold, false).apply(&data).unwrap();

        assert_eq!(name(&renamed, 1).as_deref(), Some("Personal Noto"));
        assert_eq!(name(&renamed, 2).as_deref(), Some("Bold"));
        assert_eq!(name(&renamed, 3).as_deref(), Some("2.013;GOOG;PersonalNoto-Bold"));
        assert_eq!(name(&renamed, 4).as_deref(), Some("Personal Noto Bold"));
        assert_eq!(name(&renamed, 6).as_deref(), Some("PersonalNoto-Bold"));
        assert_eq!(name(&renamed, 16), None);
        assert_eq!(name(&renamed, 17), None);
    }

    #[test]
    fn test_rename_uses_requested_style_over_source_names() {
        let data = TestFont::new("Noto Sans", "Regular").build();
        let bold = StyleKey::new(Width::Normal, Weight::Bold);
        let renamed = Renamer::new("Personal Noto", &bold, true).apply(&data).unwrap();

        assert_eq!(name(&renamed, 1).as_deref(), Some("Personal Noto"));
        assert_eq!(name(&renamed, 2).as_deref(), Some("Bold Italic"));
        assert_eq!(name(&renamed, 4).as_deref(), Some("Personal Noto Bold Italic"));
        assert_eq!(name(&renamed, 6).as_deref(), Some("PersonalNoto-BoldItalic"));
    }

    #[test]
    fn test_rename_synthesizes_typographic_names() {
        let data = TestFont::new("Noto Sans", "Regular").build();
        let style = StyleKey::new(Width::Condensed, Weight::Light);
        let renamed = Renamer::new("My Noto", &style, false).apply(&data).unwrap();

        assert_eq!(name(&renamed, 1).as_deref(), Some("My Noto Condensed Light"));
        assert_eq!(name(&renamed, 2).as_deref(), Some("Regular"));
        assert_eq!(name(&renamed, 4).as_deref(), Some("My Noto Condensed Light"));
        assert_eq!(name(&renamed, 6).as_deref(), Some("MyNoto-CondensedLight"));
        assert_eq!(name(&renamed, 16).as_deref(), Some("My Noto"));
        assert_eq!(name(&renamed, 17).as_deref(), Some("Condensed Light"));
    }

    #[test]
    fn test_rename_is_idempotent() {
        let data = TestFont::new("Noto Sans", "Condensed Light").build();
        let style = StyleKey::new(Width::Condensed, Weight::Light);
        let renamer = Renamer::new("My Noto", &style, true);
        let once = renamer.apply(&data).unwrap();
        let twice = renamer.apply(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(name(&once, 2).as_deref(), Some("Italic"));
        assert_eq!(name(&once, 17).as_deref(), Some("Condensed Light Italic"));
    }
}
