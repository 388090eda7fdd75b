//! Building one output font per style from a glyph plan.

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use notobuilder_font_merger::Merger;
use notobuilder_font_metadata::FontVersion;
use notobuilder_font_ops::units_per_em;
use notobuilder_font_scale::scale_to_upm;
use notobuilder_font_subsetter::subset_text;
use notobuilder_font_woff2::convert_to_woff2;

use crate::{
    config::TARGET_UPM,
    io::FontFile,
    planner::GlyphPlan,
    rename::Renamer,
    request::{BuildRequest, OutputFormat, StyleModifier},
    styles::StyleKey,
};

/// `Personal Noto` + `CondensedBold` + italic gives
/// `PersonalNoto-CondensedBoldItalic.ttf`; Regular italic is just `Italic`.
pub fn output_file_name(family: &str, style: &StyleKey, italic: bool) -> String {
    let family: String = family.split_whitespace().collect();
    let style = if italic { format!("{style}Italic") } else { style.to_string() };
    let style = style.replace("RegularItalic", "Italic");
    format!("{family}-{style}.ttf")
}

pub struct MergeEngine<'a> {
    request: &'a BuildRequest,
}

impl<'a> MergeEngine<'a> {
    pub fn new(request: &'a BuildRequest) -> Self {
        Self { request }
    }

    /// Subsets, rescales and merges the planned fonts, then renames and
    /// writes the result. Returns the written files, TTF first.
    pub fn build_style(&self, plan: &GlyphPlan, style: &StyleKey) -> Result<Vec<PathBuf>> {
        if plan.is_empty() {
            bail!("No fonts to merge for {style}");
        }

        let mut fonts = Vec::with_capacity(plan.len());
        for entry in &plan.entries {
            let asset = &entry.asset;
            let mut data = FontFile::new(&asset.path).read()?;
            if let Some(keep) = &entry.keep {
                data = keep
                    .subset(&data)
                    .with_context(|| format!("Failed to subset {}", asset.family))?;
                debug!("{}: kept {} codepoints", asset.family, keep.codepoints.len());
            }
            let upm = units_per_em(&data)?;
            if upm != TARGET_UPM {
                info!("{}: scaling from {upm} to {TARGET_UPM} units per em", asset.family);
                data = scale_to_upm(&data, TARGET_UPM)
                    .with_context(|| format!("Failed to rescale {}", asset.family))?;
            }
            fonts.push(data);
        }

        let start = Instant::now();
        let mut data = match fonts.as_slice() {
            [single] => single.clone(),
            _ => {
                let refs: Vec<&[u8]> = fonts.iter().map(Vec::as_slice).collect();
                let merged = Merger::default().merge(&refs).context("Failed to merge fonts")?;
                let elapsed = start.elapsed().as_secs_f64();
                println!("  ✓ Merged {} fonts ({elapsed:.2}s)", refs.len());
                merged
            }
        };

        if let Some(metrics) = &self.request.metrics {
            data = metrics.apply(&data).context("Failed to set vertical metrics")?;
        }
        let italic = self.request.scripts.has(StyleModifier::Italic);
        data = Renamer::new(&self.request.name, style, italic).apply(&data)?;
        if let Some(version) = &self.request.version {
            data = FontVersion::parse(Some(version))?.apply(&data)?;
        }
        if let Some(text) = &self.request.subset_text {
            data = subset_text(&data, text).context("Failed to subset to text")?;
        }

        self.write(&data, style, italic)
    }

    fn write(&self, data: &[u8], style: &StyleKey, italic: bool) -> Result<Vec<PathBuf>> {
        let ttf = FontFile::new(
            self.request.output_dir().join(output_file_name(&self.request.name, style, italic)),
        );
        ttf.write(data)?;
        let mut written = vec![ttf.path().to_path_buf()];

        if self.request.wants(OutputFormat::Woff2) {
            let woff2 = FontFile::new(ttf.path().with_extension(OutputFormat::Woff2.extension()));
            woff2.write(convert_to_woff2(data)?)?;
            written.push(woff2.path().to_path_buf());
        }
        Ok(written)
    }
}
