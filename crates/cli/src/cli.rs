//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use notobuilder_core::{
    BuildRequest, Catalog, Contrast, GithubFetcher, NameResolver, Notobuilder, OutputFormat,
    ScriptRequest, StyleModifier, SwapRequest, VerticalMetrics, Weight, Width,
    display_family_name,
};

#[derive(Parser)]
#[command(name = "notobuilder")]
#[command(about = "Build a custom font family out of the Noto fonts for a set of scripts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Which families to use, in precedence order.
#[derive(Debug, Clone, clap::Args)]
pub struct ScriptArgs {
    /// Scripts to cover, e.g. Latin Arabic Thai; earlier scripts win conflicts
    #[arg(short, long, num_args = 1.., required = true)]
    pub scripts: Vec<String>,
    #[arg(long, default_value = "Sans")]
    pub contrast: Contrast,
    /// Italic, Display, Mono, Kufi or Nastaliq
    #[arg(long, num_args = 1..)]
    pub styles: Vec<StyleModifier>,
    /// Use UI variants where a family has one
    #[arg(long)]
    pub ui: bool,
}

impl ScriptArgs {
    fn request(&self) -> ScriptRequest {
        ScriptRequest::new(&self.scripts, self.contrast)
            .with_modifiers(self.styles.iter().copied())
            .with_ui(self.ui)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub scripts: ScriptArgs,
    /// Family name of the output; dashes separate words
    #[arg(short, long)]
    pub name: Option<String>,
    /// Output formats; ttf is always written
    #[arg(short, long, num_args = 1.., default_value = "ttf")]
    pub output: Vec<OutputFormat>,
    /// osf, tosf, lf or altIJ
    #[arg(long, num_args = 1..)]
    pub swap: Vec<String>,
    /// Glyph presets such as BasicLatin or ExtendedGreek, or Full
    #[arg(long, num_args = 1..)]
    pub preset: Vec<String>,
    #[arg(long, num_args = 1.., default_value = "Regular")]
    pub weight: Vec<Weight>,
    #[arg(long, num_args = 1.., default_value = "Normal")]
    pub width: Vec<Width>,
    /// Use hinted sources
    #[arg(long)]
    pub hinted: bool,
    /// Ascender and descender in font units; the descender is zero or negative
    #[arg(long, num_args = 2, value_names = ["ASC", "DESC"], allow_negative_numbers = true)]
    pub metrics: Vec<i16>,
    /// Keep only the glyphs needed for this text
    #[arg(long)]
    pub subset: Option<String>,
    /// Version to stamp: 1.002, YYYY-MM-DD or YYYY-MM-DD.N
    #[arg(short, long)]
    pub version: Option<String>,
    /// Build only the styles every family has
    #[arg(long)]
    pub compat: bool,
    /// Directory holding the source cache and the output
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

impl BuildArgs {
    pub fn into_request(self) -> Result<BuildRequest> {
        let mut request = BuildRequest::new(self.scripts.request(), self.root);
        request.name = display_family_name(self.name.as_deref().unwrap_or_default());
        request.formats = self.output;
        request.swaps = SwapRequest::parse(&self.swap)?;
        request.presets = self.preset;
        request.weights = self.weight;
        request.widths = self.width;
        request.hinted = self.hinted;
        request.metrics = match self.metrics.as_slice() {
            [] => None,
            [ascender, descender] => Some(VerticalMetrics::new(*ascender, *descender)?),
            other => bail!("--metrics takes an ascender and a descender, got {other:?}"),
        };
        request.subset_text = self.subset;
        request.version = self.version;
        request.compat = self.compat;
        Ok(request)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the needed families and build the fonts
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Print the families a script list resolves to
    Resolve {
        #[command(flatten)]
        args: ScriptArgs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => {
                let request = args.into_request()?;
                let fetcher = GithubFetcher::new(request.hinted)?;
                let report = Notobuilder::new(Catalog::bundled()?, fetcher, request).run()?;
                if !report.failed.is_empty() {
                    let failed: Vec<_> = report.failed.iter().map(|s| s.as_str()).collect();
                    info!("Styles not built: {}", failed.join(", "));
                }
            }
            Commands::Resolve { args } => {
                let catalog = Catalog::default();
                for family in NameResolver::new(&catalog).resolve(&args.request()) {
                    println!("{}\t{}", family.script, family.name);
                }
            }
        }
        Ok(())
    }
}
