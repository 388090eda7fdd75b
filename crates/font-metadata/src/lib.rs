//! Font metadata manipulation (versioning, vertical metrics).

use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, NaiveDate};
use notobuilder_font_ops::{map_name_records, rewrite_font};
use read_fonts::TableProvider;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        head::Head,
        hhea::Hhea,
        os2::{Os2, SelectionFlags},
    },
    types::{FWord, Fixed},
};

/// Name table IDs.
const NAME_ID_UNIQUE_ID: u16 = 3;
const NAME_ID_VERSION: u16 = 5;

/// Font version information.
#[derive(Debug, Clone)]
pub struct FontVersion {
    /// Version date, for date-style tags.
    pub date: Option<NaiveDate>,
    /// Version tag (e.g., "1.002", "2024-01-15" or "2024-01-15.1").
    pub tag: String,
}

impl FontVersion {
    /// Create a date-based version.
    pub fn new(date: NaiveDate, tag: impl Into<String>) -> Self {
        Self { date: Some(date), tag: tag.into() }
    }

    /// Parse a version string (`1.002`, `YYYY-MM-DD` or `YYYY-MM-DD.N`) or use today's date.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None => {
                let today = chrono::Local::now().date_naive();
                Ok(Self::new(today, today.format("%Y-%m-%d").to_string()))
            }
            Some(v) => {
                // Try YYYY-MM-DD.N format first
                if let Some((date_part, build_num)) = v.rsplit_once('.')
                    && build_num.parse::<u32>().is_ok()
                    && let Ok(parsed) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                {
                    return Ok(Self::new(parsed, v));
                }

                if let Ok(parsed) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
                    return Ok(Self::new(parsed, v));
                }

                // Plain decimal, e.g. 1.002
                if let Some((major, minor)) = v.split_once('.')
                    && !major.is_empty()
                    && !minor.is_empty()
                    && major.bytes().chain(minor.bytes()).all(|b| b.is_ascii_digit())
                {
                    return Ok(Self { date: None, tag: v.to_string() });
                }

                Err(anyhow!("Invalid version '{v}'. Expected 1.002, YYYY-MM-DD or YYYY-MM-DD.N."))
            }
        }
    }

    /// Get the version string (e.g., "Version 1.002").
    pub fn version_string(&self) -> String {
        format!("Version {}", self.tag)
    }

    /// Font revision: the decimal tag itself, or YYYY.MMDD for dates.
    pub fn revision(&self) -> Fixed {
        match self.date {
            Some(date) => {
                let month_day = (date.month() * 100 + date.day()) as f64 / 10000.0;
                Fixed::from_f64(date.year() as f64 + month_day)
            }
            None => Fixed::from_f64(self.tag.parse::<f64>().unwrap_or_default()),
        }
    }

    /// Apply this version to font data.
    ///
    /// Updates `head.font_revision` and name IDs 3 (unique ID) and 5 (version).
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let version_string = self.version_string();
        let revision_value = self.revision();
        let version_tag = self.tag.clone();

        rewrite_font(data, |font, builder| {
            if let Ok(head) = font.head() {
                let mut new_head: Head = head.to_owned_table();
                new_head.font_revision = revision_value;
                builder.add_table(&new_head)?;
            }

            let new_name = map_name_records(font, |name_id, current| match name_id {
                NAME_ID_VERSION => Some(version_string.clone()),
                NAME_ID_UNIQUE_ID => Some(stamp_unique_id(current, &version_tag)),
                _ => None,
            })?;
            builder.add_table(&new_name)?;

            Ok(())
        })
    }
}

/// Replace the leading version field of a `version;vendor;psname` unique ID.
fn stamp_unique_id(current: &str, tag: &str) -> String {
    let mut parts: Vec<&str> =
        current.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();
    if parts.len() >= 2 {
        parts[0] = tag;
    } else {
        parts.insert(0, tag);
    }
    parts.join(";")
}

/// Explicit vertical metrics in font units.
///
/// `descender` is zero or negative, the sign convention of `hhea`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub ascender: i16,
    pub descender: i16,
}

impl VerticalMetrics {
    pub fn new(ascender: i16, descender: i16) -> Result<Self> {
        if ascender < 0 {
            bail!("Ascender must not be negative, got {ascender}");
        }
        if descender > 0 {
            bail!("Descender must be zero or negative, got {descender}");
        }
        Ok(Self { ascender, descender })
    }

    /// Write these metrics into `hhea` and `OS/2`.
    ///
    /// Line gaps become zero, `usWin*` mirror the typo values and
    /// `USE_TYPO_METRICS` is set on OS/2 version 4 and later.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let Self { ascender, descender } = *self;

        rewrite_font(data, |font, builder| {
            if let Ok(hhea) = font.hhea() {
                let mut new_hhea: Hhea = hhea.to_owned_table();
                new_hhea.ascender = FWord::new(ascender);
                new_hhea.descender = FWord::new(descender);
                new_hhea.line_gap = FWord::new(0);
                builder.add_table(&new_hhea)?;
            }

            if let Ok(os2) = font.os2() {
                let mut new_os2: Os2 = os2.to_owned_table();
                new_os2.s_typo_ascender = ascender;
                new_os2.s_typo_descender = descender;
                new_os2.s_typo_line_gap = 0;
                new_os2.us_win_ascent = ascender as u16;
                new_os2.us_win_descent = descender.unsigned_abs();
                if os2.version() >= 4 {
                    new_os2.fs_selection |= SelectionFlags::USE_TYPO_METRICS;
                }
                builder.add_table(&new_os2)?;
            }

            Ok(())
        })
    }
}
