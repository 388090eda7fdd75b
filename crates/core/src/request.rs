//! What a build is asked to produce.

use std::{collections::BTreeSet, fmt, path::PathBuf, str::FromStr};

use anyhow::{Error, Result, bail};
use notobuilder_font_metadata::VerticalMetrics;

use crate::{
    catalog::Catalog,
    config::{DEFAULT_FAMILY_NAME, OUTPUT_DIR_NAME},
    styles::{StyleKey, Weight, Width, style_keys},
    swap::SwapRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Contrast {
    Sans,
    Serif,
}

impl Contrast {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sans => "Sans",
            Self::Serif => "Serif",
        }
    }
}

impl FromStr for Contrast {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Sans" => Ok(Self::Sans),
            "Serif" => Ok(Self::Serif),
            _ => bail!("Unknown contrast {s:?}, expected Sans or Serif"),
        }
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleModifier {
    Italic,
    Display,
    Mono,
    Kufi,
    Nastaliq,
}

impl FromStr for StyleModifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "Italic" => Self::Italic,
            "Display" => Self::Display,
            "Mono" => Self::Mono,
            "Kufi" => Self::Kufi,
            "Nastaliq" => Self::Nastaliq,
            _ => bail!("Unknown style {s:?}, expected Italic, Display, Mono, Kufi or Nastaliq"),
        })
    }
}

/// Scripts to cover, in precedence order, and how their families are picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    pub scripts: Vec<String>,
    pub contrast: Contrast,
    pub modifiers: BTreeSet<StyleModifier>,
    pub ui: bool,
}

impl ScriptRequest {
    pub fn new(scripts: impl IntoIterator<Item = impl Into<String>>, contrast: Contrast) -> Self {
        Self {
            scripts: scripts.into_iter().map(Into::into).collect(),
            contrast,
            modifiers: BTreeSet::new(),
            ui: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = StyleModifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_ui(mut self, ui: bool) -> Self {
        self.ui = ui;
        self
    }

    pub fn has(&self, modifier: StyleModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// The requested Latin/Greek/Cyrillic scripts, in request order.
    pub fn lgc_scripts(&self) -> Vec<&str> {
        self.scripts.iter().map(String::as_str).filter(|s| Catalog::is_lgc(s)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Ttf,
    Woff2,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ttf => "ttf",
            Self::Woff2 => "woff2",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ttf" => Ok(Self::Ttf),
            "woff2" => Ok(Self::Woff2),
            _ => bail!("Unsupported output format {s:?}, expected ttf or woff2"),
        }
    }
}

/// Every option of one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Display family name of the output, e.g. "Personal Noto".
    pub name: String,
    pub scripts: ScriptRequest,
    pub widths: Vec<Width>,
    pub weights: Vec<Weight>,
    /// TTF is always written; other formats are converted from it.
    pub formats: Vec<OutputFormat>,
    pub presets: Vec<String>,
    pub swaps: SwapRequest,
    pub hinted: bool,
    pub metrics: Option<VerticalMetrics>,
    pub subset_text: Option<String>,
    pub version: Option<String>,
    /// Use the styles every family has instead of `widths` x `weights`.
    pub compat: bool,
    /// Holds the source cache and the output directory.
    pub root: PathBuf,
}

impl BuildRequest {
    pub fn new(scripts: ScriptRequest, root: impl Into<PathBuf>) -> Self {
        Self {
            name: DEFAULT_FAMILY_NAME.to_string(),
            scripts,
            widths: vec![Width::Normal],
            weights: vec![Weight::Regular],
            formats: vec![OutputFormat::Ttf],
            presets: Vec::new(),
            swaps: SwapRequest::default(),
            hinted: false,
            metrics: None,
            subset_text: None,
            version: None,
            compat: false,
            root: root.into(),
        }
    }

    /// Width-outer, weight-inner cross product of the requested styles.
    pub fn style_keys(&self) -> Vec<StyleKey> {
        style_keys(&self.widths, &self.weights)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR_NAME)
    }

    pub fn wants(&self, format: OutputFormat) -> bool {
        format == OutputFormat::Ttf || self.formats.contains(&format)
    }
}

/// `My-Noto` becomes `My Noto`; blank input falls back to the default name.
pub fn display_family_name(raw: &str) -> String {
    let name = raw.split(['-', ' ']).filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" ");
    if name.is_empty() { DEFAULT_FAMILY_NAME.to_string() } else { name }
}
