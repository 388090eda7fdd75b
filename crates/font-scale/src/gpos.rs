//! GPOS value and anchor scaling
//!
//! Device and variation tables are left untouched.

use write_fonts::tables::gpos::{
    AnchorTable, CursivePosFormat1, ExtensionSubtable, Gpos, MarkArray, MarkBasePosFormat1,
    MarkLigPosFormat1, MarkMarkPosFormat1, PairPos, PositionLookup, SinglePos, ValueRecord,
};

use crate::Scale;

pub(crate) fn scale_gpos(gpos: &mut Gpos, scale: Scale) {
    for lookup in gpos.lookup_list.lookups.iter_mut() {
        match &mut **lookup {
            PositionLookup::Single(l) => l.subtables.iter_mut().for_each(|s| single(s, scale)),
            PositionLookup::Pair(l) => l.subtables.iter_mut().for_each(|s| pair(s, scale)),
            PositionLookup::Cursive(l) => l.subtables.iter_mut().for_each(|s| cursive(s, scale)),
            PositionLookup::MarkToBase(l) => {
                l.subtables.iter_mut().for_each(|s| mark_base(s, scale))
            }
            PositionLookup::MarkToLig(l) => l.subtables.iter_mut().for_each(|s| mark_lig(s, scale)),
            PositionLookup::MarkToMark(l) => {
                l.subtables.iter_mut().for_each(|s| mark_mark(s, scale))
            }
            PositionLookup::Extension(l) => {
                for ext in l.subtables.iter_mut() {
                    match &mut **ext {
                        ExtensionSubtable::Single(e) => single(&mut e.extension, scale),
                        ExtensionSubtable::Pair(e) => pair(&mut e.extension, scale),
                        ExtensionSubtable::Cursive(e) => cursive(&mut e.extension, scale),
                        ExtensionSubtable::MarkToBase(e) => mark_base(&mut e.extension, scale),
                        ExtensionSubtable::MarkToLig(e) => mark_lig(&mut e.extension, scale),
                        ExtensionSubtable::MarkToMark(e) => mark_mark(&mut e.extension, scale),
                        ExtensionSubtable::Contextual(_) | ExtensionSubtable::ChainContextual(_) => {}
                    }
                }
            }
            PositionLookup::Contextual(_) | PositionLookup::ChainContextual(_) => {}
        }
    }
}

fn value(record: &mut ValueRecord, scale: Scale) {
    for field in [
        &mut record.x_placement,
        &mut record.y_placement,
        &mut record.x_advance,
        &mut record.y_advance,
    ] {
        if let Some(v) = field.as_mut() {
            *v = scale.i16(*v);
        }
    }
}

fn anchor(table: &mut AnchorTable, scale: Scale) {
    let (x, y) = match table {
        AnchorTable::Format1(a) => (&mut a.x_coordinate, &mut a.y_coordinate),
        AnchorTable::Format2(a) => (&mut a.x_coordinate, &mut a.y_coordinate),
        AnchorTable::Format3(a) => (&mut a.x_coordinate, &mut a.y_coordinate),
    };
    *x = scale.i16(*x);
    *y = scale.i16(*y);
}

fn single(subtable: &mut SinglePos, scale: Scale) {
    match subtable {
        SinglePos::Format1(s) => value(&mut s.value_record, scale),
        SinglePos::Format2(s) => s.value_records.iter_mut().for_each(|v| value(v, scale)),
    }
}

fn pair(subtable: &mut PairPos, scale: Scale) {
    match subtable {
        PairPos::Format1(p) => {
            for set in p.pair_sets.iter_mut() {
                for record in set.pair_value_records.iter_mut() {
                    value(&mut record.value_record1, scale);
                    value(&mut record.value_record2, scale);
                }
            }
        }
        PairPos::Format2(p) => {
            for class1 in p.class1_records.iter_mut() {
                for class2 in class1.class2_records.iter_mut() {
                    value(&mut class2.value_record1, scale);
                    value(&mut class2.value_record2, scale);
                }
            }
        }
    }
}

fn cursive(subtable: &mut CursivePosFormat1, scale: Scale) {
    for record in subtable.entry_exit_record.iter_mut() {
        if let Some(a) = record.entry_anchor.as_mut() {
            anchor(a, scale);
        }
        if let Some(a) = record.exit_anchor.as_mut() {
            anchor(a, scale);
        }
    }
}

fn marks(array: &mut MarkArray, scale: Scale) {
    for record in array.mark_records.iter_mut() {
        anchor(&mut record.mark_anchor, scale);
    }
}

fn mark_base(subtable: &mut MarkBasePosFormat1, scale: Scale) {
    marks(&mut subtable.mark_array, scale);
    for record in subtable.base_array.base_records.iter_mut() {
        for a in record.base_anchors.iter_mut().filter_map(|a| a.as_mut()) {
            anchor(a, scale);
        }
    }
}

fn mark_lig(subtable: &mut MarkLigPosFormat1, scale: Scale) {
    marks(&mut subtable.mark_array, scale);
    for attach in subtable.ligature_array.ligature_attaches.iter_mut() {
        for component in attach.component_records.iter_mut() {
            for a in component.ligature_anchors.iter_mut().filter_map(|a| a.as_mut()) {
                anchor(a, scale);
            }
        }
    }
}

fn mark_mark(subtable: &mut MarkMarkPosFormat1, scale: Scale) {
    marks(&mut subtable.mark1_array, scale);
    for record in subtable.mark2_array.mark2_records.iter_mut() {
        for a in record.mark2_anchors.iter_mut().filter_map(|a| a.as_mut()) {
            anchor(a, scale);
        }
    }
}
