//! In-place renumbering of layout tables from one source font
//!
//! Every glyph id, lookup index, mark attachment class and mark glyph set
//! index in a source font's layout tables is moved by a constant offset into
//! the merged numbering. Offsets are monotonic, so coverage and class ranges
//! stay sorted and need no rebuilding.

use read_fonts::types::GlyphId16;
use write_fonts::{
    NullableOffsetMarker, OffsetMarker,
    tables::{
        gpos::{
            self, CursivePosFormat1, ExtensionPosFormat1, MarkBasePosFormat1, MarkLigPosFormat1,
            MarkMarkPosFormat1, PairPos, PairPosFormat1, PairPosFormat2, PairSet, PairValueRecord,
            PositionChainContext, PositionLookup, PositionSequenceContext, SinglePos,
            SinglePosFormat1, SinglePosFormat2,
        },
        gsub::{
            self, AlternateSet, AlternateSubstFormat1, ExtensionSubstFormat1, Ligature, LigatureSet,
            LigatureSubstFormat1, MultipleSubstFormat1, ReverseChainSingleSubstFormat1, Sequence,
            SingleSubst, SingleSubstFormat1, SingleSubstFormat2, SubstitutionChainContext,
            SubstitutionLookup, SubstitutionSequenceContext,
        },
        layout::{
            ChainedClassSequenceRule, ChainedClassSequenceRuleSet, ChainedSequenceContext,
            ChainedSequenceContextFormat1, ChainedSequenceContextFormat2,
            ChainedSequenceContextFormat3, ChainedSequenceRule, ChainedSequenceRuleSet, ClassDef,
            ClassSequenceRule, ClassSequenceRuleSet, CoverageTable, Lookup, SequenceContext,
            SequenceContextFormat1, SequenceContextFormat2, SequenceContextFormat3,
            SequenceLookupRecord, SequenceRule, SequenceRuleSet,
        },
    },
};

use crate::context::GidRemap;

/// Where a font's mark attachment classes and mark glyph sets start in the
/// merged GDEF
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkBases {
    pub classes: u16,
    pub sets: u16,
}

/// Offsets applied to one source font's layout data
#[derive(Debug, Clone, Copy)]
pub struct Shift {
    glyphs: GidRemap,
    lookups: u16,
    marks: MarkBases,
}

impl Shift {
    pub fn new(glyphs: GidRemap, lookups: u16, marks: MarkBases) -> Self {
        Self { glyphs, lookups, marks }
    }

    pub fn is_noop(&self) -> bool {
        self.glyphs.is_identity() && self.lookups == 0 && self.marks == MarkBases::default()
    }

    pub fn mark_class(&self, class: u16) -> u16 {
        if class == 0 { 0 } else { class.saturating_add(self.marks.classes) }
    }
}

pub trait Remap {
    fn remap(&mut self, shift: &Shift);
}

impl Remap for GlyphId16 {
    fn remap(&mut self, shift: &Shift) {
        *self = shift.glyphs.shift(*self);
    }
}

impl<T: Remap> Remap for Vec<T> {
    fn remap(&mut self, shift: &Shift) {
        self.iter_mut().for_each(|item| item.remap(shift));
    }
}

impl<T: Remap, const N: usize> Remap for OffsetMarker<T, N> {
    fn remap(&mut self, shift: &Shift) {
        (**self).remap(shift);
    }
}

impl<T: Remap, const N: usize> Remap for NullableOffsetMarker<T, N> {
    fn remap(&mut self, shift: &Shift) {
        if let Some(inner) = self.as_mut() {
            inner.remap(shift);
        }
    }
}

impl Remap for CoverageTable {
    fn remap(&mut self, shift: &Shift) {
        match self {
            CoverageTable::Format1(table) => table.glyph_array.remap(shift),
            CoverageTable::Format2(table) => {
                for record in &mut table.range_records {
                    record.start_glyph_id.remap(shift);
                    record.end_glyph_id.remap(shift);
                }
            }
        }
    }
}

impl Remap for ClassDef {
    fn remap(&mut self, shift: &Shift) {
        match self {
            ClassDef::Format1(table) => table.start_glyph_id.remap(shift),
            ClassDef::Format2(table) => {
                for record in &mut table.class_range_records {
                    record.start_glyph_id.remap(shift);
                    record.end_glyph_id.remap(shift);
                }
            }
        }
    }
}

impl Remap for SequenceLookupRecord {
    fn remap(&mut self, shift: &Shift) {
        self.lookup_list_index = self.lookup_list_index.saturating_add(shift.lookups);
    }
}

impl<T: Remap> Remap for Lookup<T> {
    fn remap(&mut self, shift: &Shift) {
        if let Some(class) = self.lookup_flag.mark_attachment_class() {
            self.lookup_flag.set_mark_attachment_class(shift.mark_class(class));
        }
        if let Some(set) = self.mark_filtering_set.as_mut() {
            *set = set.saturating_add(shift.marks.sets);
        }
        self.subtables.remap(shift);
    }
}

/// Remaps the listed fields of a struct.
macro_rules! remap_fields {
    ($($ty:ty => [$($field:ident),* $(,)?];)*) => {
        $(
            impl Remap for $ty {
                fn remap(&mut self, shift: &Shift) {
                    $(self.$field.remap(shift);)*
                }
            }
        )*
    };
}

/// Remaps whichever variant an enum holds.
macro_rules! remap_variants {
    ($($ty:ty => [$($variant:ident),* $(,)?];)*) => {
        $(
            impl Remap for $ty {
                fn remap(&mut self, shift: &Shift) {
                    match self {
                        $(Self::$variant(inner) => inner.remap(shift),)*
                    }
                }
            }
        )*
    };
}

/// Shared context tables wrapped per layout table.
macro_rules! remap_newtype {
    ($($ty:ty),*) => {
        $(
            impl Remap for $ty {
                fn remap(&mut self, shift: &Shift) {
                    (**self).remap(shift);
                }
            }
        )*
    };
}

remap_fields! {
    SequenceContextFormat1 => [coverage, seq_rule_sets];
    SequenceRuleSet => [seq_rules];
    SequenceRule => [input_sequence, seq_lookup_records];
    SequenceContextFormat2 => [coverage, class_def, class_seq_rule_sets];
    ClassSequenceRuleSet => [class_seq_rules];
    ClassSequenceRule => [seq_lookup_records];
    SequenceContextFormat3 => [coverages, seq_lookup_records];
    ChainedSequenceContextFormat1 => [coverage, chained_seq_rule_sets];
    ChainedSequenceRuleSet => [chained_seq_rules];
    ChainedSequenceRule => [
        backtrack_sequence,
        input_sequence,
        lookahead_sequence,
        seq_lookup_records,
    ];
    ChainedSequenceContextFormat2 => [
        coverage,
        backtrack_class_def,
        input_class_def,
        lookahead_class_def,
        chained_class_seq_rule_sets,
    ];
    ChainedClassSequenceRuleSet => [chained_class_seq_rules];
    ChainedClassSequenceRule => [seq_lookup_records];
    ChainedSequenceContextFormat3 => [
        backtrack_coverages,
        input_coverages,
        lookahead_coverages,
        seq_lookup_records,
    ];

    SingleSubstFormat1 => [coverage];
    SingleSubstFormat2 => [coverage, substitute_glyph_ids];
    MultipleSubstFormat1 => [coverage, sequences];
    Sequence => [substitute_glyph_ids];
    AlternateSubstFormat1 => [coverage, alternate_sets];
    AlternateSet => [alternate_glyph_ids];
    LigatureSubstFormat1 => [coverage, ligature_sets];
    LigatureSet => [ligatures];
    Ligature => [ligature_glyph, component_glyph_ids];
    ReverseChainSingleSubstFormat1 => [
        coverage,
        backtrack_coverages,
        lookahead_coverages,
        substitute_glyph_ids,
    ];

    SinglePosFormat1 => [coverage];
    SinglePosFormat2 => [coverage];
    PairPosFormat1 => [coverage, pair_sets];
    PairSet => [pair_value_records];
    PairValueRecord => [second_glyph];
    PairPosFormat2 => [coverage, class_def1, class_def2];
    CursivePosFormat1 => [coverage];
    MarkBasePosFormat1 => [mark_coverage, base_coverage];
    MarkLigPosFormat1 => [mark_coverage, ligature_coverage];
    MarkMarkPosFormat1 => [mark1_coverage, mark2_coverage];
}

remap_variants! {
    SequenceContext => [Format1, Format2, Format3];
    ChainedSequenceContext => [Format1, Format2, Format3];
    SingleSubst => [Format1, Format2];
    gsub::ExtensionSubtable => [
        Single, Multiple, Alternate, Ligature, Contextual, ChainContextual, Reverse,
    ];
    SubstitutionLookup => [
        Single, Multiple, Alternate, Ligature, Contextual, ChainContextual, Extension, Reverse,
    ];
    SinglePos => [Format1, Format2];
    PairPos => [Format1, Format2];
    gpos::ExtensionSubtable => [
        Single, Pair, Cursive, MarkToBase, MarkToLig, MarkToMark, Contextual, ChainContextual,
    ];
    PositionLookup => [
        Single, Pair, Cursive, MarkToBase, MarkToLig, MarkToMark, Contextual, ChainContextual,
        Extension,
    ];
}

remap_newtype!(
    SubstitutionSequenceContext,
    SubstitutionChainContext,
    PositionSequenceContext,
    PositionChainContext
);

impl<T: Remap> Remap for ExtensionSubstFormat1<T> {
    fn remap(&mut self, shift: &Shift) {
        self.extension.remap(shift);
    }
}

impl<T: Remap> Remap for ExtensionPosFormat1<T> {
    fn remap(&mut self, shift: &Shift) {
        self.extension.remap(shift);
    }
}
