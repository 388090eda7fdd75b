//! Resolution of scripts to Noto family names.

use std::fmt;

use log::debug;

use crate::{
    catalog::Catalog,
    request::{Contrast, ScriptRequest, StyleModifier},
};

const PREFIX: &str = "Noto";
const ITALIC_SUFFIX: &str = "-Italic";
const UI_SUFFIX: &str = "UI";

/// A Noto family, e.g. `NotoSans`, `NotoSans-Italic` or `NotoSansArabicUI`.
///
/// An `-Italic` suffix selects the italic files of the base family.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyName(String);

impl FamilyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The family without its `-Italic` suffix; names the source repository and cache folder.
    pub fn base(&self) -> &str {
        self.0.split_once('-').map_or(self.0.as_str(), |(base, _)| base)
    }

    pub fn is_italic(&self) -> bool {
        self.0.ends_with(ITALIC_SUFFIX)
    }

    /// The same family with Sans and Serif exchanged.
    pub fn swap_contrast(&self) -> Option<Self> {
        let swapped = |from: &str, to: &str| {
            self.0.strip_prefix(from).map(|rest| Self(format!("{to}{rest}")))
        };
        swapped("NotoSerif", "NotoSans").or_else(|| swapped("NotoSans", "NotoSerif"))
    }
}

impl fmt::Display for FamilyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A family and the script that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFamily {
    pub script: String,
    pub name: FamilyName,
}

impl ResolvedFamily {
    pub fn is_lgc(&self) -> bool {
        Catalog::is_lgc(&self.script)
    }
}

pub struct NameResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> NameResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Families for every requested script, in request order, without duplicates.
    ///
    /// The first script resolving to a family keeps it.
    pub fn resolve(&self, request: &ScriptRequest) -> Vec<ResolvedFamily> {
        let mut resolved: Vec<ResolvedFamily> = Vec::with_capacity(request.scripts.len());
        for script in &request.scripts {
            let name = self.family_name(script, request);
            if resolved.iter().any(|r| r.name == name) {
                debug!("{script} shares {name} with an earlier script");
                continue;
            }
            resolved.push(ResolvedFamily { script: script.clone(), name });
        }
        resolved
    }

    pub fn family_name(&self, script: &str, request: &ScriptRequest) -> FamilyName {
        let italic = if request.has(StyleModifier::Italic) { ITALIC_SUFFIX } else { "" };
        let mut contrast = request.contrast;

        let suffix = match script {
            s if Catalog::is_lgc(s) => {
                let display = if request.has(StyleModifier::Display) { "Display" } else { "" };
                let mono = if request.has(StyleModifier::Mono) { "Mono" } else { "" };
                format!("{display}{mono}{italic}")
            }
            "Tamil" => format!("Tamil{italic}"),
            "Arabic" => {
                if request.has(StyleModifier::Kufi) {
                    "Kufi".to_string()
                } else if request.has(StyleModifier::Nastaliq) {
                    "Nastaliq".to_string()
                } else {
                    "Naskh".to_string()
                }
            }
            other => {
                if contrast == Contrast::Serif && self.catalog.is_sans_only(other) {
                    contrast = Contrast::Sans;
                }
                other.replace(' ', "")
            }
        };

        let candidate = format!("{PREFIX}{contrast}{suffix}");
        let mut name = self.catalog.naming_exception(&candidate).map_or(candidate, str::to_string);
        if request.ui && self.catalog.has_ui_variant(&name) {
            name.push_str(UI_SUFFIX);
        }
        FamilyName(name)
    }
}
