use crate::db::azure::UsageRow;
use tiberius::{ColumnData, Row};

/// Convert a `SELECT BEN_REG, sexe, age, <code>, PSP_SPE, BOITES` row into a
/// `UsageRow`. Segment columns arrive as ints or varchars depending on the
/// table vintage, so conversion is by value shape rather than declared type.
/// Rows with a null segment column are dropped; null box counts become 0.
pub fn into_usage_row(row: Row) -> Option<UsageRow> {
    let mut cells = row.into_iter();
    let region = cell_to_string(cells.next()?)?;
    let sex = cell_to_string(cells.next()?)?;
    let age = cell_to_string(cells.next()?)?;
    let product = cell_to_string(cells.next()?)?;
    let prescriber = cell_to_string(cells.next()?)?;
    let boxes = cells.next().and_then(cell_to_f64).unwrap_or(0.0);
    Some(UsageRow {
        region,
        sex,
        age,
        product,
        prescriber,
        boxes,
    })
}

pub(crate) fn cell_to_string(cell: ColumnData<'_>) -> Option<String> {
    match cell {
        ColumnData::String(v) => v.map(|s| s.into_owned()),
        ColumnData::U8(v) => v.map(|n| n.to_string()),
        ColumnData::I16(v) => v.map(|n| n.to_string()),
        ColumnData::I32(v) => v.map(|n| n.to_string()),
        ColumnData::I64(v) => v.map(|n| n.to_string()),
        ColumnData::F32(v) => v.map(|n| n.to_string()),
        ColumnData::F64(v) => v.map(|n| n.to_string()),
        ColumnData::Numeric(v) => v.map(|n| n.to_string()),
        ColumnData::Bit(v) => v.map(|b| (b as u8).to_string()),
        _ => None,
    }
}

pub(crate) fn cell_to_f64(cell: ColumnData<'_>) -> Option<f64> {
    match cell {
        ColumnData::U8(v) => v.map(f64::from),
        ColumnData::I16(v) => v.map(f64::from),
        ColumnData::I32(v) => v.map(f64::from),
        ColumnData::I64(v) => v.map(|n| n as f64),
        ColumnData::F32(v) => v.map(f64::from),
        ColumnData::F64(v) => v,
        ColumnData::Numeric(v) => v.map(|n| n.value() as f64 / 10f64.powi(n.scale() as i32)),
        ColumnData::String(v) => v.and_then(|s| s.trim().parse().ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn strings_and_ints_both_convert() {
        assert_eq!(
            cell_to_string(ColumnData::String(Some(Cow::from("11")))),
            Some("11".to_string())
        );
        assert_eq!(cell_to_string(ColumnData::I32(Some(11))), Some("11".to_string()));
        assert_eq!(cell_to_string(ColumnData::I64(None)), None);
    }

    #[test]
    fn box_counts_coerce_to_f64() {
        assert_eq!(cell_to_f64(ColumnData::I64(Some(3718))), Some(3718.0));
        assert_eq!(cell_to_f64(ColumnData::F64(Some(12.5))), Some(12.5));
        assert_eq!(
            cell_to_f64(ColumnData::String(Some(Cow::from("42")))),
            Some(42.0)
        );
        assert_eq!(cell_to_f64(ColumnData::String(Some(Cow::from("n/a")))), None);
    }
}
