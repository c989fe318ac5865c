use log::warn;
use std::fmt::Write as _;

use crate::repository::SessionResults;

pub const RESULTS_FILE_NAME: &str = "TestTimes.csv";
pub const HEADER: &str = "Shape Name,Time (seconds),Correct,Chosen Shape";

pub const CORRECT_ANSWERS_KEY: &str = "Correct Answers";
pub const ROUNDS_COMPLETED_KEY: &str = "Rounds Completed";
pub const SET_COMPLETED_KEY: &str = "Set Completed";

#[must_use]
pub fn archive_file_name(stamp: &str) -> String {
    format!("TestTimes_{stamp}.csv")
}

/// Text appended for one session. A fresh file starts with the header.
#[must_use]
pub fn format_session(results: &SessionResults, sessions_recorded: u32, with_header: bool) -> String {
    let mut out = String::new();
    if with_header {
        out.push_str(HEADER);
        out.push('\n');
    }
    for entry in &results.log {
        let _ = writeln!(
            out,
            "{},{:.2},{},{}",
            entry.shape_name,
            entry.seconds,
            entry.correctness_label(),
            entry.chosen
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{CORRECT_ANSWERS_KEY},{}", results.correct_count);
    let _ = writeln!(out, "{ROUNDS_COMPLETED_KEY}, {sessions_recorded}");
    let _ = writeln!(out, "{SET_COMPLETED_KEY}, {}", results.chosen_set.index());
    let _ = writeln!(out);
    out
}

/// Last parseable value recorded under `key`.
///
/// Only `key,value` lines count; a value that does not parse is skipped.
#[must_use]
pub fn last_record(contents: &str, key: &str) -> Option<i64> {
    let mut found = None;
    for line in contents.lines() {
        let mut parts = line.split(',');
        let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        if name.trim() != key {
            continue;
        }
        match value.trim().parse::<i64>() {
            Ok(v) => found = Some(v),
            Err(_) => warn!("ignoring unparseable `{key}` value {:?}", value.trim()),
        }
    }
    found
}
