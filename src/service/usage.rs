use crate::db::UsageRow;
use crate::service::reference_maps::ReferenceMaps;
use crate::types::UnifiedRecord;
use std::collections::BTreeMap;

/// Whether an aggregate came from the brand (CIP13) or generic (GEN_NUM)
/// query; decides which label column the rendered record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    Brand,
    Generic,
}

/// Usage totals for one (region, sex, age, product) group: the summed box
/// count plus the per-prescriber breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageAggregate {
    pub region: String,
    pub sex: String,
    pub age: String,
    pub product: String,
    pub total_boxes: f64,
    pub by_prescriber: BTreeMap<String, f64>,
}

/// Group raw rows by (region, sex, age, product), summing box counts and
/// pivoting the prescriber column into per-prescriber sums. Output order is
/// the key order, so results are deterministic.
pub fn aggregate_usage(rows: Vec<UsageRow>) -> Vec<UsageAggregate> {
    let mut groups: BTreeMap<(String, String, String, String), (f64, BTreeMap<String, f64>)> =
        BTreeMap::new();

    for row in rows {
        let key = (row.region, row.sex, row.age, row.product);
        let (total, by_prescriber) = groups.entry(key).or_default();
        *total += row.boxes;
        *by_prescriber.entry(row.prescriber).or_insert(0.0) += row.boxes;
    }

    groups
        .into_iter()
        .map(
            |((region, sex, age, product), (total_boxes, by_prescriber))| UsageAggregate {
                region,
                sex,
                age,
                product,
                total_boxes,
                by_prescriber,
            },
        )
        .collect()
}

/// Render aggregates for the wire: segment and product codes mapped to their
/// labels, prescriber columns relabeled through the prescriber map.
pub fn to_unified_records(
    aggregates: &[UsageAggregate],
    kind: ProductKind,
    maps: &ReferenceMaps,
) -> Vec<UnifiedRecord> {
    aggregates
        .iter()
        .map(|agg| {
            let (medication, generic) = match kind {
                ProductKind::Brand => (Some(maps.product.label(&agg.product)), None),
                // Generic group numbers have no label table; they pass through.
                ProductKind::Generic => (None, Some(agg.product.clone())),
            };
            let prescribers = agg
                .by_prescriber
                .iter()
                .map(|(code, boxes)| (maps.prescriber.label(code), *boxes))
                .collect();
            UnifiedRecord {
                total_boites: agg.total_boxes,
                region: maps.region.label(&agg.region),
                sex: maps.sex.label(&agg.sex),
                age: maps.age.label(&agg.age),
                medication,
                generic,
                prescribers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::reference_maps::CodeMap;

    fn row(region: &str, sex: &str, age: &str, product: &str, prescriber: &str, boxes: f64) -> UsageRow {
        UsageRow {
            region: region.to_string(),
            sex: sex.to_string(),
            age: age.to_string(),
            product: product.to_string(),
            prescriber: prescriber.to_string(),
            boxes,
        }
    }

    #[test]
    fn sums_boxes_and_pivots_prescribers() {
        let rows = vec![
            row("11", "1", "20", "3400930000001", "1", 10.0),
            row("11", "1", "20", "3400930000001", "1", 5.0),
            row("11", "1", "20", "3400930000001", "7", 2.0),
            row("84", "2", "40", "3400930000001", "1", 3.0),
        ];

        let aggs = aggregate_usage(rows);
        assert_eq!(aggs.len(), 2);

        let first = &aggs[0];
        assert_eq!(first.region, "11");
        assert_eq!(first.total_boxes, 17.0);
        assert_eq!(first.by_prescriber.get("1"), Some(&15.0));
        assert_eq!(first.by_prescriber.get("7"), Some(&2.0));

        let second = &aggs[1];
        assert_eq!(second.region, "84");
        assert_eq!(second.total_boxes, 3.0);
    }

    #[test]
    fn renders_labels_and_flattened_prescribers() {
        let maps = ReferenceMaps {
            sex: CodeMap::from_entries([("1", "Male")]),
            age: CodeMap::from_entries([("20", "20-39")]),
            region: CodeMap::from_entries([("11", "Ile-de-France")]),
            prescriber: CodeMap::from_entries([("1", "General Medical Practice (Private)")]),
            product: CodeMap::from_entries([("3400930000001", "Doliprane 1000mg")]),
        };

        let aggs = aggregate_usage(vec![row("11", "1", "20", "3400930000001", "1", 15.0)]);
        let brand = to_unified_records(&aggs, ProductKind::Brand, &maps);

        assert_eq!(brand.len(), 1);
        assert_eq!(brand[0].region, "Ile-de-France");
        assert_eq!(brand[0].sex, "Male");
        assert_eq!(brand[0].age, "20-39");
        assert_eq!(brand[0].medication.as_deref(), Some("Doliprane 1000mg"));
        assert_eq!(brand[0].generic, None);
        assert_eq!(
            brand[0].prescribers.get("General Medical Practice (Private)"),
            Some(&15.0)
        );

        let generic = to_unified_records(&aggs, ProductKind::Generic, &maps);
        assert_eq!(generic[0].medication, None);
        assert_eq!(generic[0].generic.as_deref(), Some("3400930000001"));
    }

    #[test]
    fn unmapped_codes_pass_through_in_rendering() {
        let aggs = aggregate_usage(vec![row("93", "9", "99", "815", "42", 1.0)]);
        let rendered = to_unified_records(&aggs, ProductKind::Generic, &ReferenceMaps::default());
        assert_eq!(rendered[0].region, "93");
        assert_eq!(rendered[0].prescribers.get("42"), Some(&1.0));
    }
}
