use crate::service::reference_maps::ReferenceMaps;
use crate::service::usage::UsageAggregate;
use crate::types::MetricsRecord;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Compare brand against generic usage across segments. Produces the five
/// comparison tables keyed by name, each sorted ascending by brand share:
/// `segment_comparison`, `region_summary`, `age_summary`, `gender_summary`,
/// `prescriber_comparison`.
pub fn compare_brand_generic(
    brand: &[UsageAggregate],
    generic: &[UsageAggregate],
    maps: &ReferenceMaps,
) -> BTreeMap<String, Vec<MetricsRecord>> {
    let segments = segment_comparison(brand, generic, maps);

    let mut metrics = BTreeMap::new();
    metrics.insert(
        "region_summary".to_string(),
        rollup(&segments, |seg| seg.region.clone(), |label, rec| rec.region = label),
    );
    metrics.insert(
        "age_summary".to_string(),
        rollup(&segments, |seg| seg.age.clone(), |label, rec| rec.age = label),
    );
    metrics.insert(
        "gender_summary".to_string(),
        rollup(&segments, |seg| seg.sex.clone(), |label, rec| rec.sex = label),
    );
    metrics.insert(
        "prescriber_comparison".to_string(),
        prescriber_comparison(brand, generic, maps),
    );
    metrics.insert("segment_comparison".to_string(), segments);
    metrics
}

/// Outer-join brand and generic totals on (region, sex, age); either side
/// absent counts as zero. Labels are applied before the one-dimensional
/// rollups so those group by display label.
fn segment_comparison(
    brand: &[UsageAggregate],
    generic: &[UsageAggregate],
    maps: &ReferenceMaps,
) -> Vec<MetricsRecord> {
    let mut joined: BTreeMap<(String, String, String), (f64, f64)> = BTreeMap::new();
    for agg in brand {
        let key = (agg.region.clone(), agg.sex.clone(), agg.age.clone());
        joined.entry(key).or_default().0 += agg.total_boxes;
    }
    for agg in generic {
        let key = (agg.region.clone(), agg.sex.clone(), agg.age.clone());
        joined.entry(key).or_default().1 += agg.total_boxes;
    }

    let mut records: Vec<MetricsRecord> = joined
        .into_iter()
        .map(|((region, sex, age), (brand_total, generic_total))| MetricsRecord {
            region: Some(maps.region.label(&region)),
            sex: Some(maps.sex.label(&sex)),
            age: Some(maps.age.label(&age)),
            prescriber: None,
            ..totals_record(brand_total, generic_total)
        })
        .collect();
    sort_by_share(&mut records);
    records
}

/// One-dimensional rollup of the segment table.
fn rollup<K, S>(segments: &[MetricsRecord], key: K, set_label: S) -> Vec<MetricsRecord>
where
    K: Fn(&MetricsRecord) -> Option<String>,
    S: Fn(Option<String>, &mut MetricsRecord),
{
    let mut grouped: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for seg in segments {
        let Some(label) = key(seg) else { continue };
        let entry = grouped.entry(label).or_default();
        entry.0 += seg.brand_total;
        entry.1 += seg.generic_total;
    }

    let mut records: Vec<MetricsRecord> = grouped
        .into_iter()
        .map(|(label, (brand_total, generic_total))| {
            let mut record = totals_record(brand_total, generic_total);
            set_label(Some(label), &mut record);
            record
        })
        .collect();
    sort_by_share(&mut records);
    records
}

/// Outer-join per-prescriber box counts on (region, sex, age, prescriber).
fn prescriber_comparison(
    brand: &[UsageAggregate],
    generic: &[UsageAggregate],
    maps: &ReferenceMaps,
) -> Vec<MetricsRecord> {
    type PrescriberKey = (String, String, String, String);
    let mut joined: BTreeMap<PrescriberKey, (f64, f64)> = BTreeMap::new();
    for agg in brand {
        for (prescriber, boxes) in &agg.by_prescriber {
            let key = (
                agg.region.clone(),
                agg.sex.clone(),
                agg.age.clone(),
                prescriber.clone(),
            );
            joined.entry(key).or_default().0 += boxes;
        }
    }
    for agg in generic {
        for (prescriber, boxes) in &agg.by_prescriber {
            let key = (
                agg.region.clone(),
                agg.sex.clone(),
                agg.age.clone(),
                prescriber.clone(),
            );
            joined.entry(key).or_default().1 += boxes;
        }
    }

    let mut records: Vec<MetricsRecord> = joined
        .into_iter()
        .map(
            |((region, sex, age, prescriber), (brand_total, generic_total))| MetricsRecord {
                region: Some(maps.region.label(&region)),
                sex: Some(maps.sex.label(&sex)),
                age: Some(maps.age.label(&age)),
                prescriber: Some(maps.prescriber.label(&prescriber)),
                ..totals_record(brand_total, generic_total)
            },
        )
        .collect();
    sort_by_share(&mut records);
    records
}

fn totals_record(brand_total: f64, generic_total: f64) -> MetricsRecord {
    let combined_total = brand_total + generic_total;
    let brand_share = (combined_total != 0.0).then(|| brand_total / combined_total);
    MetricsRecord {
        brand_total,
        generic_total,
        combined_total,
        brand_share,
        region: None,
        sex: None,
        age: None,
        prescriber: None,
    }
}

/// Ascending by share; zero-combined rows (null share) sort last.
fn sort_by_share(records: &mut [MetricsRecord]) {
    records.sort_by(|a, b| match (a.brand_share, b.brand_share) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
