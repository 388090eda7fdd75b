//! name table merging

use read_fonts::{FontRef, types::Tag};
use write_fonts::FontBuilder;

/// The merged font is named after the first font; callers rename it afterwards.
pub fn merge_name(first: &FontRef, builder: &mut FontBuilder) {
    let tag = Tag::new(b"name");
    if let Some(data) = first.table_data(tag) {
        builder.add_raw(tag, data.as_bytes().to_vec());
    }
}
