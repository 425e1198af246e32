//! Partitioned parallel dispatch of cleaned event rows.
//!
//! The rows are cut into contiguous, nearly equal partitions. Every partition
//! runs on its own tokio task with its own User-Agent and processes its rows
//! sequentially; partitions run independently of each other and their
//! outcomes are merged into a single [`RunSummary`] once all have finished.

use crate::config::Settings;
use crate::models::{EventRow, RunSummary};
use crate::worker::run_partition;
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Available parallelism minus one (to keep the machine responsive), never below 1.
pub fn default_partition_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Split `rows` into exactly `count.max(1)` contiguous partitions.
///
/// The first `len % count` partitions get one extra row. When there are more
/// partitions than rows the trailing partitions are empty.
pub fn split_partitions<T>(rows: Vec<T>, count: usize) -> Vec<Vec<T>> {
    let count = count.max(1);
    let base = rows.len() / count;
    let extra = rows.len() % count;

    let mut rows = rows.into_iter();
    (0..count)
        .map(|i| {
            let size = base + usize::from(i < extra);
            rows.by_ref().take(size).collect()
        })
        .collect()
}

/// Fetch, extract and persist every row, `settings.partitions` partitions at a time.
///
/// Blocks until all partitions are done. A partition task that dies is logged
/// and counted in [`RunSummary::failed_partitions`]; the others are unaffected.
#[instrument(level = "info", skip_all, fields(rows = rows.len(), partitions = settings.partitions))]
pub async fn dispatch(rows: Vec<EventRow>, settings: &Settings) -> RunSummary {
    let t0 = Instant::now();
    let total = rows.len();
    let partitions = split_partitions(rows, settings.partitions);

    let mut summary = RunSummary {
        partitions: partitions.len(),
        rows: total,
        ..RunSummary::default()
    };

    let handles = partitions
        .into_iter()
        .enumerate()
        .map(|(index, rows)| {
            info!(partition = index, rows = rows.len(), "Starting partition");
            tokio::spawn(run_partition(
                index,
                rows,
                settings.output_dir.clone(),
                settings.timeout,
            ))
        })
        .collect::<Vec<_>>();

    for (index, joined) in join_all(handles).await.into_iter().enumerate() {
        match joined {
            Ok(report) => {
                debug!(partition = report.index, rows = report.outcomes.len(), "Partition reported");
                summary.absorb(&report);
            }
            Err(e) => {
                error!(partition = index, error = %e, "Partition task failed");
                summary.failed_partitions += 1;
            }
        }
    }

    let elapsed = t0.elapsed();
    info!(
        rows = summary.rows,
        written = summary.written,
        skipped = summary.skipped,
        failed_partitions = summary.failed_partitions,
        skip_counts = ?summary.skip_counts,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Dispatch complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DEFAULT_ID_PREFIX, clean_events};
    use crate::test_support::spawn_news_server;
    use std::path::Path;
    use std::time::Duration;

    fn settings(output_dir: &Path, partitions: usize) -> Settings {
        Settings {
            output_dir: output_dir.to_path_buf(),
            partitions,
            timeout: Duration::from_secs(5),
            ..Settings::default()
        }
    }

    fn txt_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".txt"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_default_partition_count_is_at_least_one() {
        assert!(default_partition_count() >= 1);
    }

    #[test]
    fn test_split_even() {
        let parts = split_partitions((0..8).collect::<Vec<i32>>(), 4);
        assert_eq!(parts, vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]);
    }

    #[test]
    fn test_split_uneven_front_loads_extra_rows() {
        let parts = split_partitions((0..10).collect::<Vec<i32>>(), 4);
        assert_eq!(
            parts,
            vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7], vec![8, 9]]
        );
    }

    #[test]
    fn test_split_single_partition_keeps_order() {
        let parts = split_partitions(vec!["c", "a", "b"], 1);
        assert_eq!(parts, vec![vec!["c", "a", "b"]]);
    }

    #[test]
    fn test_split_more_partitions_than_rows() {
        let parts = split_partitions(vec![1, 2], 4);
        assert_eq!(parts, vec![vec![1], vec![2], vec![], vec![]]);
    }

    #[test]
    fn test_split_zero_partitions_clamped() {
        let parts = split_partitions(vec![1, 2, 3], 0);
        assert_eq!(parts, vec![vec![1, 2, 3]]);
        assert_eq!(split_partitions(Vec::<u8>::new(), 3).len(), 3);
    }

    #[tokio::test]
    async fn test_only_http_rows_produce_files() {
        let server = spawn_news_server();
        let dir = tempfile::tempdir().unwrap();
        let rows = clean_events(
            vec![
                EventRow::new("1", server.url("/2019/03/01/story-a")),
                EventRow::new("2", "ftp://example.com/story"),
                EventRow::new("3", server.url("/news/story-b")),
            ],
            DEFAULT_ID_PREFIX,
        );

        let summary = dispatch(rows, &settings(dir.path(), 2)).await;

        assert_eq!(txt_files(dir.path()), vec!["ID1.txt", "ID3.txt"]);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_eight_rows_four_partitions_all_written() {
        let server = spawn_news_server();
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<EventRow> = (0..8)
            .map(|i| EventRow::new(format!("ID{i}"), server.url("/news/story-b")))
            .collect();

        let summary = dispatch(rows, &settings(dir.path(), 4)).await;

        assert_eq!(summary.partitions, 4);
        assert_eq!(summary.written, 8);
        assert_eq!(summary.failed_partitions, 0);
        let expected: Vec<String> = (0..8).map(|i| format!("ID{i}.txt")).collect();
        assert_eq!(txt_files(dir.path()), expected);
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let server = spawn_news_server();
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            EventRow::new("ID1", server.url("/missing")),
            EventRow::new("ID2", server.url("/news/story-b")),
            EventRow::new("ID3", server.url("/report.pdf")),
        ];

        let summary = dispatch(rows, &settings(dir.path(), 1)).await;

        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.skip_counts.get("http_status"), Some(&1));
        assert_eq!(summary.skip_counts.get("extraction"), Some(&1));
        assert_eq!(txt_files(dir.path()), vec!["ID2.txt"]);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_with_identical_content() {
        let server = spawn_news_server();
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            EventRow::new("ID1", server.url("/2019/03/01/story-a")),
            EventRow::new("ID2", server.url("/news/story-b")),
        ];

        dispatch(rows.clone(), &settings(dir.path(), 2)).await;
        let first = std::fs::read_to_string(dir.path().join("ID1.txt")).unwrap();
        dispatch(rows, &settings(dir.path(), 2)).await;
        let second = std::fs::read_to_string(dir.path().join("ID1.txt")).unwrap();

        assert_eq!(first, second);
        assert_eq!(txt_files(dir.path()), vec!["ID1.txt", "ID2.txt"]);
    }

    #[tokio::test]
    async fn test_empty_input_completes() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dispatch(Vec::new(), &settings(dir.path(), 3)).await;
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.written, 0);
        assert_eq!(summary.partitions, 3);
        assert!(txt_files(dir.path()).is_empty());
    }
}
