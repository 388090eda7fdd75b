//! The build: resolve, sync, then one select/plan/merge pass per style.

use std::{fs::remove_dir, path::PathBuf, time::Instant};

use anyhow::{Result, bail};
use log::{debug, warn};

use crate::{
    cache::{SourceCache, SourceFetcher},
    catalog::Catalog,
    config::WORK_DIR_NAME,
    io::Intermediates,
    merge::MergeEngine,
    naming::{NameResolver, ResolvedFamily},
    planner::{ReportedCodepoints, SubsetPlanner},
    request::BuildRequest,
    styles::{FontAsset, StyleKey, StyleSelector},
    swap::GlyphSwapper,
};

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub outputs: Vec<PathBuf>,
    /// Styles that produced nothing.
    pub failed: Vec<StyleKey>,
}

pub struct Notobuilder<F> {
    catalog: Catalog,
    cache: SourceCache<F>,
    request: BuildRequest,
}

impl<F: SourceFetcher> Notobuilder<F> {
    /// The cache lives under the request's root.
    pub fn new(catalog: Catalog, fetcher: F, request: BuildRequest) -> Self {
        let cache = SourceCache::new(&request.root, fetcher);
        Self { catalog, cache, request }
    }

    /// Builds every requested style; a failing style is reported and skipped.
    ///
    /// Fails when no style produced a font.
    pub fn run(&self) -> Result<BuildReport> {
        self.catalog.validate_presets(&self.request.presets)?;

        let start = Instant::now();
        println!("═══════════════════════════════════════════════════════════");
        println!("  Building {}", self.request.name);
        println!("═══════════════════════════════════════════════════════════");

        let resolved = NameResolver::new(&self.catalog).resolve(&self.request.scripts);
        let names: Vec<_> = resolved.iter().map(|r| r.name.as_str()).collect();
        println!("Families: {}", names.join(", "));

        let families = self.cache.ensure(&resolved);
        if families.is_empty() {
            bail!("None of the requested families are available");
        }

        let styles = self.styles(&families)?;
        let total = styles.len();
        let mut reported = ReportedCodepoints::default();
        let mut report = BuildReport::default();

        for (i, style) in styles.iter().enumerate() {
            println!("\n[{}/{total}] {style}", i + 1);
            let style_start = Instant::now();
            match self.build_style(&families, style, &mut reported) {
                Ok(written) => {
                    for path in &written {
                        let name = path.file_name().unwrap_or_default().to_string_lossy();
                        println!("  ✓ {name} ({:.2}s)", style_start.elapsed().as_secs_f64());
                    }
                    report.outputs.extend(written);
                }
                Err(e) => {
                    warn!("{style}: {e:#}");
                    println!("  ✗ {style} failed");
                    report.failed.push(style.clone());
                }
            }
        }

        if let Err(e) = remove_dir(self.work_dir()) {
            debug!("Work directory left in place: {e}");
        }
        if report.outputs.is_empty() {
            bail!("No fonts were built");
        }

        println!("\n═══════════════════════════════════════════════════════════");
        println!(
            "  ✓ {} files in {} ({:.2}s)",
            report.outputs.len(),
            self.request.output_dir().display(),
            start.elapsed().as_secs_f64()
        );
        println!("═══════════════════════════════════════════════════════════");
        Ok(report)
    }

    fn styles(&self, families: &[ResolvedFamily]) -> Result<Vec<StyleKey>> {
        if !self.request.compat {
            return Ok(self.request.style_keys());
        }
        let names: Vec<_> = families.iter().map(|f| f.name.clone()).collect();
        let styles = StyleSelector::new(self.cache.layout()).common_styles(&names)?;
        if styles.is_empty() {
            bail!("The requested families share no style");
        }
        Ok(styles)
    }

    fn work_dir(&self) -> PathBuf {
        self.request.root.join(WORK_DIR_NAME)
    }

    fn build_style(
        &self,
        families: &[ResolvedFamily],
        style: &StyleKey,
        reported: &mut ReportedCodepoints,
    ) -> Result<Vec<PathBuf>> {
        let assets = StyleSelector::new(self.cache.layout()).select(families, style);
        if assets.is_empty() {
            bail!("No family has a file for {style}");
        }
        for asset in assets.iter().filter(|a| a.fallback) {
            println!("  ✓ {} [FALLBACK]", asset.file_name());
        }

        let mut intermediates = Intermediates::default();
        let assets = self.swap(assets, &mut intermediates)?;

        let planner = SubsetPlanner::new(&self.catalog);
        let assets =
            planner.pre_subset(assets, &self.request, &self.work_dir(), &mut intermediates)?;
        let plan = planner.plan(&assets, reported)?;
        debug!("{style}: {} fonts, {} to subset", plan.len(), plan.subset_count());

        let written = MergeEngine::new(&self.request).build_style(&plan, style)?;
        intermediates.remove_all();
        Ok(written)
    }

    /// Points LGC assets at swapped copies where the swaps apply.
    fn swap(
        &self,
        assets: Vec<FontAsset>,
        intermediates: &mut Intermediates,
    ) -> Result<Vec<FontAsset>> {
        if self.request.swaps.is_empty() {
            return Ok(assets);
        }
        let swapper = GlyphSwapper::new(&self.request.swaps);
        assets
            .into_iter()
            .map(|asset| -> Result<FontAsset> {
                if !asset.is_lgc() {
                    return Ok(asset);
                }
                Ok(match swapper.apply(&asset)? {
                    Some(path) => {
                        intermediates.push(path.clone());
                        FontAsset { path, ..asset }
                    }
                    None => asset,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs::read};

    use anyhow::Context;
    use notobuilder_font_ops::{read_name_records, unicode_mappings};
    use read_fonts::FontRef;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        cache::RemoteFile,
        request::{Contrast, ScriptRequest},
        styles::Weight,
        swap::{FigureStyle, SwapRequest},
        test_fonts::TestFont,
    };

    /// Serves whole families from memory.
    #[derive(Default)]
    struct FontFetcher {
        families: BTreeMap<String, Vec<(String, Vec<u8>)>>,
    }

    impl FontFetcher {
        fn with(mut self, family: &str, fonts: Vec<(&str, TestFont)>) -> Self {
            let files = fonts
                .into_iter()
                .map(|(style, font)| (format!("{family}-{style}.ttf"), font.build()))
                .collect();
            self.families.insert(family.to_string(), files);
            self
        }
    }

    impl SourceFetcher for FontFetcher {
        fn change_token(&self, family: &str) -> Result<String> {
            if !self.families.contains_key(family) {
                bail!("HTTP 404 Not Found");
            }
            Ok("v1".to_string())
        }

        fn list(&self, family: &str) -> Result<Vec<RemoteFile>> {
            let files = self.families.get(family).context("missing")?;
            Ok(files
                .iter()
                .map(|(name, _)| RemoteFile {
                    name: name.clone(),
                    download_url: Some(format!("mem://{family}/{name}")),
                })
                .collect())
        }

        fn fetch(&self, file: &RemoteFile) -> Result<Vec<u8>> {
            self.families
                .values()
                .flatten()
                .find(|(name, _)| *name == file.name)
                .map(|(_, data)| data.clone())
                .context("missing file")
        }
    }

    fn mapped(path: &std::path::Path) -> Vec<u32> {
        let data = read(path).unwrap();
        unicode_mappings(&FontRef::new(&data).unwrap()).unwrap().into_keys().collect()
    }

    fn latin_and_thai() -> FontFetcher {
        FontFetcher::default()
            .with(
                "NotoSans",
                vec![
                    ("Regular", TestFont::new("Noto Sans", "Regular").chars("AB-")),
                    ("Bold", TestFont::new("Noto Sans", "Bold").chars("AB-")),
                ],
            )
            .with(
                "NotoSansThai",
                vec![("Regular", TestFont::new("Noto Sans Thai", "Regular").chars("\u{E01}-"))],
            )
    }

    #[test]
    fn test_build_two_styles_with_fallback() {
        let dir = tempdir().unwrap();
        let mut request =
            BuildRequest::new(ScriptRequest::new(["Latin", "Thai"], Contrast::Sans), dir.path());
        request.presets = vec!["Full".to_string()];
        request.weights = vec![Weight::Regular, Weight::Bold];

        let builder = Notobuilder::new(Catalog::default(), latin_and_thai(), request);
        let report = builder.run().unwrap();

        let output = dir.path().join("Custom_Fonts");
        assert_eq!(
            report.outputs,
            vec![output.join("PersonalNoto-Regular.ttf"), output.join("PersonalNoto-Bold.ttf")]
        );
        assert!(report.failed.is_empty());
        for path in &report.outputs {
            assert_eq!(mapped(path), vec![0x2D, 0x41, 0x42, 0x0E01]);
        }
        assert!(!dir.path().join(WORK_DIR_NAME).exists());
    }

    #[test]
    fn test_fallback_first_family_named_for_built_style() {
        let dir = tempdir().unwrap();
        let fetcher = FontFetcher::default()
            .with("NotoSans", vec![("Regular", TestFont::new("Noto Sans", "Regular").chars("A"))])
            .with(
                "NotoSansThai",
                vec![
                    ("Regular", TestFont::new("Noto Sans Thai", "Regular").chars("\u{E01}")),
                    ("Bold", TestFont::new("Noto Sans Thai", "Bold").chars("\u{E01}")),
                ],
            );
        let mut request =
            BuildRequest::new(ScriptRequest::new(["Latin", "Thai"], Contrast::Sans), dir.path());
        request.presets = vec!["Full".to_string()];
        request.weights = vec![Weight::Bold];

        let report = Notobuilder::new(Catalog::default(), fetcher, request).run().unwrap();
        assert_eq!(report.outputs, vec![dir.path().join("Custom_Fonts/PersonalNoto-Bold.ttf")]);

        let data = read(&report.outputs[0]).unwrap();
        let names: BTreeMap<u16, String> = read_name_records(&FontRef::new(&data).unwrap())
            .unwrap()
            .into_iter()
            .filter(|e| e.platform_id == 3)
            .map(|e| (e.name_id, e.value))
            .collect();
        assert_eq!(names[&2], "Bold");
        assert_eq!(names[&4], "Personal Noto Bold");
        assert_eq!(names[&6], "PersonalNoto-Bold");
    }

    #[test]
    fn test_unavailable_family_is_dropped() {
        let dir = tempdir().unwrap();
        let mut request =
            BuildRequest::new(ScriptRequest::new(["Latin", "Khmer"], Contrast::Sans), dir.path());
        request.presets = vec!["Full".to_string()];

        let report = Notobuilder::new(Catalog::default(), latin_and_thai(), request).run().unwrap();
        assert_eq!(report.outputs.len(), 1);
        assert_eq!(mapped(&report.outputs[0]), vec![0x2D, 0x41, 0x42]);
    }

    #[test]
    fn test_swap_copies_are_removed() {
        let dir = tempdir().unwrap();
        let fetcher = FontFetcher::default().with(
            "NotoSans",
            vec![(
                "Regular",
                TestFont::new("Noto Sans", "Regular")
                    .glyph("zero", &[0x30])
                    .glyph("zero.osf", &[]),
            )],
        );
        let mut request =
            BuildRequest::new(ScriptRequest::new(["Latin"], Contrast::Sans), dir.path());
        request.presets = vec!["Full".to_string()];
        request.swaps = SwapRequest { figures: Some(FigureStyle::OldStyle), alt_ij: false };

        let report = Notobuilder::new(Catalog::default(), fetcher, request).run().unwrap();
        assert_eq!(report.outputs.len(), 1);
        let swapped = dir.path().join("NotoSans/instance_ttf/NotoSans-Regular.swap.ttf");
        assert!(!swapped.exists());
        assert!(dir.path().join("NotoSans/instance_ttf/NotoSans-Regular.ttf").exists());
    }

    #[test]
    fn test_nothing_built_is_an_error() {
        let dir = tempdir().unwrap();
        let request =
            BuildRequest::new(ScriptRequest::new(["Khmer"], Contrast::Sans), dir.path());
        assert!(Notobuilder::new(Catalog::default(), latin_and_thai(), request).run().is_err());
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let dir = tempdir().unwrap();
        let mut request =
            BuildRequest::new(ScriptRequest::new(["Latin"], Contrast::Sans), dir.path());
        request.presets = vec!["Huge".to_string()];
        assert!(Notobuilder::new(Catalog::default(), latin_and_thai(), request).run().is_err());
    }
}
