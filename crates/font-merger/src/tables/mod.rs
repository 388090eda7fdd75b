//! Table-specific merge implementations

pub mod cmap;
pub mod gdef;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hint;
pub mod hmtx;
pub mod layout;
pub mod layout_types;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;
pub mod remap;

/// Projects one field out of every font's copy of a table.
pub(crate) fn values<T, U>(tables: &[T], f: impl Fn(&T) -> U) -> Vec<U> {
    tables.iter().map(f).collect()
}
