//! Case-insensitive value search over a record set.

use crate::error::{CatalogError, Result};
use crate::models::Record;

/// Rows where `value` occurs (case-insensitively) in any column, or only in
/// `column` when one is given. Each matching row is returned once.
///
/// # Errors
///
/// [`CatalogError::NotFound`] when nothing matches or `column` is not a
/// column of the record kind.
pub fn search<'r, T: Record>(records: &'r [T], value: &str, column: Option<&str>) -> Result<Vec<&'r T>> {
    let index = match column {
        Some(name) => Some(
            T::KIND
                .columns()
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| {
                    CatalogError::not_found(name, format!("{} has no such column", T::KIND))
                })?,
        ),
        None => None,
    };

    let needle = value.to_lowercase();
    let hits: Vec<&T> = records
        .iter()
        .filter(|r| {
            let values = r.values();
            match index {
                Some(i) => values[i].to_lowercase().contains(&needle),
                None => values.iter().any(|v| v.to_lowercase().contains(&needle)),
            }
        })
        .collect();

    if hits.is_empty() {
        return Err(CatalogError::not_found(
            value,
            format!("no {} row contains it", T::KIND),
        ));
    }
    Ok(hits)
}
