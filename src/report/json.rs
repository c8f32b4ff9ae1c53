//! Structured report output
//!
//! One JSON object with `refs`, `commits`, `trees`, `blobs` sections.
//! Zero-valued histogram bins and disabled dimensions are omitted; map
//! key order is insertion order, so two runs over the same repository
//! serialize identically.

use serde_json::{json, Map, Value};

use super::SurveyReport;
use crate::stats::hist::{hbin_bounds, qbin_bounds, SizeBin, PBIN_LEN};
use crate::stats::large::LargeItemVec;
use crate::stats::BaseStats;
use crate::telemetry::Telemetry;

pub fn render(report: &SurveyReport) -> Value {
    let mut top = Map::new();
    top.insert("refs".to_string(), refs_section(report));
    top.insert("commits".to_string(), commits_section(report));
    top.insert("trees".to_string(), trees_section(report));
    top.insert("blobs".to_string(), blobs_section(report));
    Value::Object(top)
}

/// Feed the finished sections to the telemetry sink.
pub fn emit_sections(report: &SurveyReport, telemetry: &Telemetry) {
    telemetry.data("refs", &refs_section(report));
    telemetry.data("commits", &commits_section(report));
    telemetry.data("trees", &trees_section(report));
    telemetry.data("blobs", &blobs_section(report));
}

pub fn refs_section(report: &SurveyReport) -> Value {
    let s = &report.stats.refs;
    let w = &report.refs_wanted;
    let mut m = Map::new();

    m.insert("count".to_string(), json!(s.total));

    let mut by_type = Map::new();
    if w.branches {
        by_type.insert("branches".to_string(), json!(s.branches));
    }
    if w.tags {
        by_type.insert("lightweight_tags".to_string(), json!(s.lightweight_tags));
        by_type.insert("annotated_tags".to_string(), json!(s.annotated_tags));
    }
    if w.remotes {
        by_type.insert("remotes".to_string(), json!(s.remotes));
    }
    if w.detached {
        by_type.insert("detached".to_string(), json!(s.detached));
    }
    if w.other {
        by_type.insert("other".to_string(), json!(s.other));
    }
    // Symrefs cut across the type classification, but a dedicated
    // section would be more confusing than one extra key here.
    if s.symrefs != 0 {
        by_type.insert("symrefs".to_string(), json!(s.symrefs));
    }
    m.insert("count_by_type".to_string(), Value::Object(by_type));

    let mut by_storage = Map::new();
    by_storage.insert("loose_refs".to_string(), json!(s.loose));
    by_storage.insert("packed_refs".to_string(), json!(s.packed));
    m.insert("count_by_storage".to_string(), Value::Object(by_storage));

    let mut lengths = Map::new();
    if s.len_sum_local_refnames != 0 {
        lengths.insert("max_local".to_string(), json!(s.len_max_local_refname));
        lengths.insert("sum_local".to_string(), json!(s.len_sum_local_refnames));
    }
    if s.len_sum_remote_refnames != 0 {
        lengths.insert("max_remote".to_string(), json!(s.len_max_remote_refname));
        lengths.insert("sum_remote".to_string(), json!(s.len_sum_remote_refnames));
    }
    m.insert("refname_length".to_string(), Value::Object(lengths));

    m.insert("requested".to_string(), json!(report.requested));

    let by_class: Vec<Value> = s
        .by_class
        .iter()
        .map(|(class, count)| json!({ "class": class, "count": count }))
        .collect();
    m.insert("count_by_class".to_string(), Value::Array(by_class));

    Value::Object(m)
}

pub fn commits_section(report: &SurveyReport) -> Value {
    let c = &report.stats.commits;
    let mut m = Map::new();

    base_object(&mut m, &c.base);
    large_item_vec(&mut m, &c.largest_by_nr_parents, report.name_rev);
    large_item_vec(&mut m, &c.largest_by_size_bytes, report.name_rev);

    let mut pbin = Map::new();
    for (k, count) in c.parent_cnt_pbin.iter().enumerate().take(PBIN_LEN) {
        if *count != 0 {
            pbin.insert(format!("P{:02}", k), json!(count));
        }
    }
    m.insert("count_by_nr_parents".to_string(), Value::Object(pbin));

    Value::Object(m)
}

pub fn trees_section(report: &SurveyReport) -> Value {
    let t = &report.stats.trees;
    let mut m = Map::new();

    base_object(&mut m, &t.base);
    m.insert("sum_entries".to_string(), json!(t.sum_entries));
    large_item_vec(&mut m, &t.largest_by_nr_entries, report.name_rev);
    large_item_vec(&mut m, &t.largest_by_size_bytes, report.name_rev);
    m.insert(
        "dist_by_nr_entries".to_string(),
        qbin_object(&t.entry_qbin),
    );

    Value::Object(m)
}

pub fn blobs_section(report: &SurveyReport) -> Value {
    let b = &report.stats.blobs;
    let mut m = Map::new();

    base_object(&mut m, &b.base);
    large_item_vec(&mut m, &b.largest_by_size_bytes, report.name_rev);

    Value::Object(m)
}

fn base_object(m: &mut Map<String, Value>, base: &BaseStats) {
    m.insert("count".to_string(), json!(base.seen));
    m.insert("sum_size".to_string(), json!(base.sum_size));
    m.insert("sum_disk_size".to_string(), json!(base.sum_disk_size));

    let mut whence = Map::new();
    // Missing is not technically a storage location, but a separate
    // key-of-one section is not worth it.
    let pairs = [
        ("missing", base.missing),
        ("cached", base.cached),
        ("loose", base.loose),
        ("packed", base.packed),
        ("dbcached", base.dbcached),
    ];
    for (key, value) in pairs {
        if value != 0 {
            whence.insert(key.to_string(), json!(value));
        }
    }
    m.insert("count_by_whence".to_string(), Value::Object(whence));

    m.insert("dist_by_size".to_string(), hbin_object(&base.size_hbin));
}

fn hbin_object(bins: &[SizeBin]) -> Value {
    let mut m = Map::new();
    for (k, bin) in bins.iter().enumerate() {
        if bin.count == 0 {
            continue;
        }
        let (lower, upper) = hbin_bounds(k);
        m.insert(
            format!("H{}", k),
            json!({
                "count": bin.count,
                "sum_size": bin.sum_size,
                "sum_disk_size": bin.sum_disk_size,
                "hbin_lower": lower,
                "hbin_upper": upper,
            }),
        );
    }
    Value::Object(m)
}

fn qbin_object(bins: &[SizeBin]) -> Value {
    let mut m = Map::new();
    for (k, bin) in bins.iter().enumerate() {
        if bin.count == 0 {
            continue;
        }
        let (lower, upper) = qbin_bounds(k);
        m.insert(
            format!("Q{:02}", k),
            json!({
                "count": bin.count,
                "sum_size": bin.sum_size,
                "sum_disk_size": bin.sum_disk_size,
                "qbin_lower": lower,
                "qbin_upper": upper,
            }),
        );
    }
    Value::Object(m)
}

fn large_item_vec(m: &mut Map<String, Value>, vec: &LargeItemVec, name_rev: bool) {
    if !vec.is_enabled() {
        return;
    }
    let items: Vec<Value> = vec
        .items()
        .iter()
        .map(|item| {
            let mut entry = Map::new();
            entry.insert(vec.labels.json_item.to_string(), json!(item.magnitude));
            entry.insert("oid".to_string(), json!(item.oid.to_string()));
            if let Some(name) = &item.name {
                entry.insert("name".to_string(), json!(name.to_string()));
            }
            if let Some(commit) = &item.containing_commit {
                entry.insert("commit_oid".to_string(), json!(commit.to_string()));
            }
            if name_rev {
                if let Some(rev) = &item.name_rev {
                    entry.insert("name_rev".to_string(), json!(rev));
                }
            }
            Value::Object(entry)
        })
        .collect();
    m.insert(vec.labels.json_dimension.to_string(), Value::Array(items));
}
