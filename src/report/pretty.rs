//! Tabular report output
//!
//! Fixed-width tables under `OVERVIEW / REFS / COMMITS / TREES / BLOBS`
//! section headers. Write failures propagate so a broken stdout turns
//! into a non-zero exit.

use std::io::{self, Write};

use super::SurveyReport;
use crate::stats::hist::{hbin_bounds, qbin_bounds, SizeBin, PBIN_LEN};
use crate::stats::large::LargeItemVec;
use crate::stats::BaseStats;
use gix::object::Kind;

const LABEL_COLUMN: usize = 62;
const TABLE_COLUMN: usize = 28;
const RULE: &str =
    "-------------------------------------------------------------------------------";

pub fn write_report(report: &SurveyReport, out: &mut impl Write) -> io::Result<()> {
    write_header(out)?;
    write_overview(report, out)?;
    write_refs(report, out)?;
    write_commits(report, out)?;
    write_trees(report, out)?;
    write_blobs(report, out)?;
    Ok(())
}

fn write_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "==============================================================================="
    )?;
    writeln!(out, "Repository Survey Results")?;
    writeln!(
        out,
        "==============================================================================="
    )?;
    writeln!(out)
}

fn section_header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)
}

fn txt_line(out: &mut impl Write, indent: usize, text: &str) -> io::Result<()> {
    writeln!(out, "{:indent$}{}", "", text, indent = indent)
}

fn txt_pair(out: &mut impl Write, indent: usize, label: &str, value: u64) -> io::Result<()> {
    writeln!(
        out,
        "{:indent$}{:<width$} : {:>14}",
        "",
        label,
        value,
        indent = indent,
        width = LABEL_COLUMN - indent
    )
}

fn tbl_hr(out: &mut impl Write, indent: usize, value_columns: usize) -> io::Result<()> {
    write!(out, "{:indent$}{}", "", "-".repeat(TABLE_COLUMN - indent), indent = indent)?;
    for _ in 0..value_columns {
        write!(out, "-+-{}", "-".repeat(14))?;
    }
    writeln!(out)
}

fn tbl_hdr(
    out: &mut impl Write,
    indent: usize,
    bucket: &str,
    value_headers: &[&str],
) -> io::Result<()> {
    write!(
        out,
        "{:indent$}{:<width$}",
        "",
        bucket,
        indent = indent,
        width = TABLE_COLUMN - indent
    )?;
    for header in value_headers {
        write!(out, " | {:>14}", header)?;
    }
    writeln!(out)
}

fn tbl_row(
    out: &mut impl Write,
    indent: usize,
    bucket: &str,
    values: &[u64],
) -> io::Result<()> {
    write!(
        out,
        "{:indent$}{:<width$}",
        "",
        bucket,
        indent = indent,
        width = TABLE_COLUMN - indent
    )?;
    for value in values {
        write!(out, " | {:>14}", value)?;
    }
    writeln!(out)
}

/// A count/size/disk-size table over the non-empty buckets of a
/// histogram, with inclusive magnitude ranges as row labels.
fn size_histogram(
    out: &mut impl Write,
    indent: usize,
    caption: &str,
    bucket_header: &str,
    bins: &[SizeBin],
    bounds: fn(usize) -> (u64, u64),
) -> io::Result<()> {
    writeln!(out)?;
    txt_line(out, indent, caption)?;
    tbl_hr(out, indent, 3)?;
    tbl_hdr(out, indent, bucket_header, &["Count", "Size", "Disk Size"])?;
    tbl_hr(out, indent, 3)?;
    for (k, bin) in bins.iter().enumerate() {
        if bin.count == 0 {
            continue;
        }
        let (lower, upper) = bounds(k);
        tbl_row(
            out,
            indent,
            &format!("{}..{}", lower, upper),
            &[bin.count as u64, bin.sum_size, bin.sum_disk_size],
        )?;
    }
    tbl_hr(out, indent, 3)
}

fn base_object(out: &mut impl Write, indent: usize, base: &BaseStats) -> io::Result<()> {
    let indent1 = indent + 4;

    txt_pair(out, indent, "Total Count", base.seen as u64)?;

    writeln!(out)?;
    txt_line(out, indent, "Count by Storage Location")?;
    let locations = [
        ("Missing", base.missing),
        ("Cached", base.cached),
        ("Loose", base.loose),
        ("Packed", base.packed),
        ("DBCached", base.dbcached),
    ];
    for (label, count) in locations {
        if count != 0 {
            txt_pair(out, indent1, label, count as u64)?;
        }
    }

    writeln!(out)?;
    txt_pair(out, indent, "Total Size in Bytes", base.sum_size)?;
    txt_pair(out, indent, "Total Disk Size in Bytes", base.sum_disk_size)?;

    size_histogram(
        out,
        indent,
        "Histogram by Size in Bytes",
        "Byte Range",
        &base.size_hbin,
        hbin_bounds,
    )
}

fn large_item_table(
    out: &mut impl Write,
    indent: usize,
    report: &SurveyReport,
    vec: &LargeItemVec,
) -> io::Result<()> {
    if !vec.is_enabled() {
        return Ok(());
    }

    // Pathname column only applies to trees and blobs.
    let mut name_width = 0;
    if vec.object_kind() != Kind::Commit {
        for item in vec.items() {
            if let Some(name) = &item.name {
                name_width = name_width.max(name.len());
            }
        }
        if name_width > 0 {
            name_width = name_width.max("Name".len());
        }
    }

    let mut commit_width = 0;
    if report.name_rev {
        commit_width = "Commit / Name Rev".len();
        for item in vec.items() {
            if let Some(rev) = &item.name_rev {
                commit_width = commit_width.max(rev.len());
            }
        }
    } else if vec.object_kind() != Kind::Commit {
        commit_width = report.hash_hex_len;
    }

    let hr = |out: &mut dyn Write| -> io::Result<()> {
        write!(out, "{:indent$}{}-+-{}", "", "-".repeat(report.hash_hex_len), "-".repeat(14), indent = indent)?;
        if name_width > 0 {
            write!(out, "-+-{}", "-".repeat(name_width))?;
        }
        if commit_width > 0 {
            write!(out, "-+-{}", "-".repeat(commit_width))?;
        }
        writeln!(out)
    };

    writeln!(out)?;
    txt_line(out, indent, vec.labels.pretty_dimension)?;
    hr(out)?;
    write!(
        out,
        "{:indent$}{:<oid$} | {:>14}",
        "",
        "OID",
        vec.labels.pretty_item,
        indent = indent,
        oid = report.hash_hex_len
    )?;
    if name_width > 0 {
        write!(out, " | {:<name_width$}", "Name")?;
    }
    if commit_width > 0 {
        write!(out, " | {:<commit_width$}", "Commit / Name Rev")?;
    }
    writeln!(out)?;
    hr(out)?;

    for item in vec.items() {
        write!(
            out,
            "{:indent$}{:<oid$} | {:>14}",
            "",
            item.oid.to_string(),
            item.magnitude,
            indent = indent,
            oid = report.hash_hex_len
        )?;
        if name_width > 0 {
            let name = item.name.as_ref().map(|n| n.to_string()).unwrap_or_default();
            write!(out, " | {:<name_width$}", name)?;
        }
        if commit_width > 0 {
            let commit = match (&item.name_rev, &item.containing_commit) {
                (Some(rev), _) if report.name_rev => rev.clone(),
                (_, Some(oid)) => oid.to_string(),
                _ => String::new(),
            };
            write!(out, " | {:<commit_width$}", commit)?;
        }
        writeln!(out)?;
    }

    hr(out)
}

fn write_overview(report: &SurveyReport, out: &mut impl Write) -> io::Result<()> {
    let s = &report.stats;
    let indent1 = 4;
    let indent2 = 8;

    section_header(out, "OVERVIEW")?;
    txt_pair(out, indent1, "Total Number of Refs", s.refs.total as u64)?;

    writeln!(out)?;
    txt_line(out, indent1, "Overview by Object Type")?;
    tbl_hr(out, indent1, 3)?;
    tbl_hdr(out, indent1, "Type", &["Count", "Size", "Disk Size"])?;
    tbl_hr(out, indent1, 3)?;
    tbl_row(
        out,
        indent2,
        "Commits",
        &[
            s.commits.base.seen as u64,
            s.commits.base.sum_size,
            s.commits.base.sum_disk_size,
        ],
    )?;
    tbl_row(
        out,
        indent2,
        "Trees",
        &[
            s.trees.base.seen as u64,
            s.trees.base.sum_size,
            s.trees.base.sum_disk_size,
        ],
    )?;
    tbl_row(
        out,
        indent2,
        "Blobs",
        &[
            s.blobs.base.seen as u64,
            s.blobs.base.sum_size,
            s.blobs.base.sum_disk_size,
        ],
    )?;
    tbl_hr(out, indent1, 3)?;
    tbl_row(
        out,
        indent1,
        "Total",
        &[
            (s.commits.base.seen + s.trees.base.seen + s.blobs.base.seen) as u64,
            s.commits.base.sum_size + s.trees.base.sum_size + s.blobs.base.sum_size,
            s.commits.base.sum_disk_size + s.trees.base.sum_disk_size + s.blobs.base.sum_disk_size,
        ],
    )?;
    tbl_hr(out, indent1, 3)?;
    writeln!(out)
}

fn write_refs(report: &SurveyReport, out: &mut impl Write) -> io::Result<()> {
    let s = &report.stats.refs;
    let w = &report.refs_wanted;
    let indent1 = 4;
    let indent2 = 8;
    let indent3 = 12;

    section_header(out, "REFS")?;
    txt_pair(out, indent1, "Total Number of Refs", s.total as u64)?;

    writeln!(out)?;
    txt_line(out, indent1, "Reference Count by Type")?;
    if w.remotes && s.remotes != 0 {
        txt_pair(out, indent2, "Remote Tracking Branches", s.remotes as u64)?;
    }
    if w.branches && s.branches != 0 {
        txt_pair(out, indent2, "Branches", s.branches as u64)?;
    }
    if w.tags && s.lightweight_tags != 0 {
        txt_pair(out, indent2, "Tags (Lightweight)", s.lightweight_tags as u64)?;
    }
    if w.tags && s.annotated_tags != 0 {
        txt_pair(out, indent2, "Tags (Annotated)", s.annotated_tags as u64)?;
    }
    if w.detached && s.detached != 0 {
        txt_pair(out, indent2, "Detached", s.detached as u64)?;
    }
    if w.other && s.other != 0 {
        txt_pair(out, indent2, "Other (Notes and Stashes)", s.other as u64)?;
    }
    if s.symrefs != 0 {
        txt_pair(out, indent2, "Symbolic Refs (like 'HEAD')", s.symrefs as u64)?;
    }

    writeln!(out)?;
    txt_pair(
        out,
        indent1,
        "Reference Count by Class",
        s.by_class.len() as u64,
    )?;
    for (class, count) in &s.by_class {
        txt_pair(out, indent2, class, *count as u64)?;
    }

    writeln!(out)?;
    txt_line(out, indent1, "Reference Count by Storage Location")?;
    txt_pair(out, indent2, "Loose", s.loose as u64)?;
    txt_pair(out, indent2, "Packed", s.packed as u64)?;

    writeln!(out)?;
    txt_line(out, indent1, "String Length of Refnames")?;
    if s.len_sum_remote_refnames != 0 {
        txt_line(out, indent2, "Remote Refs")?;
        txt_pair(out, indent3, "Max", s.len_max_remote_refname as u64)?;
        txt_pair(out, indent3, "Sum", s.len_sum_remote_refnames as u64)?;
    }
    if s.len_sum_local_refnames != 0 {
        txt_line(out, indent2, "Local Refs")?;
        txt_pair(out, indent3, "Max", s.len_max_local_refname as u64)?;
        txt_pair(out, indent3, "Sum", s.len_sum_local_refnames as u64)?;
    }

    if report.verbose && !report.requested.is_empty() {
        writeln!(out)?;
        txt_line(out, indent1, "Requested Ref Patterns")?;
        for pattern in &report.requested {
            txt_line(out, indent2, pattern)?;
        }
    }

    writeln!(out)
}

fn write_commits(report: &SurveyReport, out: &mut impl Write) -> io::Result<()> {
    let c = &report.stats.commits;
    let indent1 = 4;

    section_header(out, "COMMITS")?;
    base_object(out, indent1, &c.base)?;

    large_item_table(out, indent1, report, &c.largest_by_size_bytes)?;

    writeln!(out)?;
    txt_line(out, indent1, "Histogram by Number of Parents")?;
    tbl_hr(out, indent1, 1)?;
    tbl_hdr(out, indent1, "Parents", &["Count"])?;
    tbl_hr(out, indent1, 1)?;
    for (k, count) in c.parent_cnt_pbin.iter().enumerate().take(PBIN_LEN) {
        if *count != 0 {
            tbl_row(out, indent1, &format!("{:2}", k), &[*count as u64])?;
        }
    }
    tbl_hr(out, indent1, 1)?;

    large_item_table(out, indent1, report, &c.largest_by_nr_parents)?;

    writeln!(out)
}

fn write_trees(report: &SurveyReport, out: &mut impl Write) -> io::Result<()> {
    let t = &report.stats.trees;
    let indent1 = 4;

    section_header(out, "TREES")?;
    base_object(out, indent1, &t.base)?;

    large_item_table(out, indent1, report, &t.largest_by_size_bytes)?;

    size_histogram(
        out,
        indent1,
        "Tree Histogram by Number of Entries",
        "Entry Range",
        &t.entry_qbin,
        qbin_bounds,
    )?;

    large_item_table(out, indent1, report, &t.largest_by_nr_entries)?;

    writeln!(out)
}

fn write_blobs(report: &SurveyReport, out: &mut impl Write) -> io::Result<()> {
    let b = &report.stats.blobs;
    let indent1 = 4;

    section_header(out, "BLOBS")?;
    base_object(out, indent1, &b.base)?;

    large_item_table(out, indent1, report, &b.largest_by_size_bytes)?;

    writeln!(out)
}
