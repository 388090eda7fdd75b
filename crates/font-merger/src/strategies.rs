//! Value merge strategies shared by the fixed-layout tables

use crate::{MergeError, Result};

/// All values must agree; returns the first
pub fn equal<T: PartialEq + Clone>(
    values: &[T],
    table: &'static str,
    field: &'static str,
) -> Result<T> {
    let (first, rest) = values.split_first().ok_or(MergeError::NoFonts)?;
    if rest.iter().all(|v| v == first) {
        Ok(first.clone())
    } else {
        Err(MergeError::NotEqual { table, field })
    }
}

pub fn first<T: Clone>(values: &[T]) -> Result<T> {
    values.first().cloned().ok_or(MergeError::NoFonts)
}

pub fn max<T: Ord + Clone>(values: &[T]) -> Result<T> {
    values.iter().max().cloned().ok_or(MergeError::NoFonts)
}

pub fn min<T: Ord + Clone>(values: &[T]) -> Result<T> {
    values.iter().min().cloned().ok_or(MergeError::NoFonts)
}

/// Merges 16-bit flag words bit by bit.
///
/// `Some(true)` ORs the bit across fonts, `Some(false)` ANDs it, `None` keeps
/// the first font's bit.
pub fn merge_bits(values: &[u16], bit_map: &[Option<bool>; 16]) -> Result<u16> {
    let first = *values.first().ok_or(MergeError::NoFonts)?;

    Ok(bit_map.iter().enumerate().fold(0u16, |acc, (bit, mode)| {
        let mask = 1u16 << bit;
        let set = match mode {
            Some(true) => values.iter().any(|v| v & mask != 0),
            Some(false) => values.iter().all(|v| v & mask != 0),
            None => first & mask != 0,
        };
        if set { acc | mask } else { acc }
    }))
}

/// ORs every value together
pub fn union_bits<T>(values: impl IntoIterator<Item = T>) -> T
where
    T: std::ops::BitOr<Output = T> + Default,
{
    values.into_iter().fold(T::default(), |a, b| a | b)
}
