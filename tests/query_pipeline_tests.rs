use lograke::agg::{run_query, GroupBy};
use lograke::output::write_results;
use lograke::query::{Dimension, Granularity, Query};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_log_file(dir: &Path, date: &str, rows: &[&str]) {
    let path = dir.join(format!("{}.log.csv", date));
    let mut content = String::new();
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

fn query(
    from: &str,
    to: &str,
    granularity: Granularity,
    dimensions: Vec<Dimension>,
    user: Option<&str>,
    app: Option<&str>,
) -> Query {
    Query::new(
        Query::parse_datetime(from).unwrap(),
        Query::parse_datetime(to).unwrap(),
        granularity,
        dimensions,
        Query::parse_filter(user),
        Query::parse_filter(app),
    )
    .unwrap()
}

/// Seed three days of data spread across users and apps.
fn seed_dataset(dir: &Path) {
    write_log_file(
        dir,
        "2025-01-01",
        &[
            "2025-01-01 00:10:00,user1,facebook,1,1,1,1,1,1,1,1,1",
            "2025-01-01 00:20:00,user1,twitter,2,2,2,2,2,2,2,2,2",
            "2025-01-01 14:29:59,user2,facebook,3,3,3,3,3,3,3,3,3",
            "2025-01-01 14:30:00,user2,facebook,4,4,4,4,4,4,4,4,4",
        ],
    );
    write_log_file(
        dir,
        "2025-01-02",
        &[
            "2025-01-02 09:00:00,user1,facebook,5,5,5,5,5,5,5,5,5",
            "2025-01-02 23:59:59,user3,youtube,6,6,6,6,6,6,6,6,6",
        ],
    );
    write_log_file(
        dir,
        "2025-01-03",
        &[
            "2025-01-03 12:00:00,user2,twitter,7,7,7,7,7,7,7,7,7",
            "2025-01-03 12:00:01,user1,facebook,8,8,8,8,8,8,8,8,8",
        ],
    );
}

#[tokio::test]
async fn test_spec_scenario_single_daily_bucket() {
    // Two rows for user1/app1 on one day collapse into a single output row
    // with metric_1 summed and row_count 2.
    let dir = TempDir::new().unwrap();
    write_log_file(
        dir.path(),
        "2025-01-01",
        &[
            "2025-01-01 00:10:00,user1,app1,1,0,0,0,0,0,0,0,0",
            "2025-01-01 00:20:00,user1,app1,2,0,0,0,0,0,0,0,0",
        ],
    );

    let q = query(
        "2025-01-01 00:00:00",
        "2025-01-01 23:59:59",
        Granularity::OneDay,
        vec![Dimension::User],
        None,
        None,
    );
    let (result, stats) = run_query(dir.path(), &q, 4).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(stats.rows_matched, 2);

    let out = dir.path().join("result.csv");
    write_results(&result, GroupBy::from_dimensions(&q.dimensions), &out).unwrap();
    let content = fs::read_to_string(&out).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "2025-01-01 00:00:00,user1,3,0,0,0,0,0,0,0,0,2");
}

#[tokio::test]
async fn test_output_independent_of_thread_count_and_rerun() {
    let logs = TempDir::new().unwrap();
    let results = TempDir::new().unwrap();
    seed_dataset(logs.path());

    let q = query(
        "2025-01-01 00:00:00",
        "2025-01-03 23:59:59",
        Granularity::ThirtyMinutes,
        vec![Dimension::User, Dimension::App],
        None,
        None,
    );
    let group_by = GroupBy::from_dimensions(&q.dimensions);

    let mut outputs = Vec::new();
    for (i, threads) in [1usize, 2, 8, 8].iter().enumerate() {
        let (result, _) = run_query(logs.path(), &q, *threads).await.unwrap();
        let out = results.path().join(format!("result_{}.csv", i));
        write_results(&result, group_by, &out).unwrap();
        outputs.push(fs::read(&out).unwrap());
    }

    // Any worker count, and re-running the same query, produce identical bytes.
    for other in &outputs[1..] {
        assert_eq!(&outputs[0], other);
    }
}

#[tokio::test]
async fn test_filter_composition() {
    // Filtering by user and app together must equal applying the user
    // filter first and the app filter on what remains.
    let full = TempDir::new().unwrap();
    seed_dataset(full.path());

    let user_filter = "user1,user2";
    let app_filter = "facebook";

    // Build a directory holding only rows that pass the user filter.
    let user_only = TempDir::new().unwrap();
    for entry in fs::read_dir(full.path()).unwrap() {
        let entry = entry.unwrap();
        let kept: String = fs::read_to_string(entry.path())
            .unwrap()
            .lines()
            .filter(|line| {
                let user = line.split(',').nth(1).unwrap();
                user == "user1" || user == "user2"
            })
            .map(|line| format!("{}\n", line))
            .collect();
        fs::write(user_only.path().join(entry.file_name()), kept).unwrap();
    }

    let both = query(
        "2025-01-01 00:00:00",
        "2025-01-03 23:59:59",
        Granularity::OneDay,
        vec![Dimension::User, Dimension::App],
        Some(user_filter),
        Some(app_filter),
    );
    let staged = query(
        "2025-01-01 00:00:00",
        "2025-01-03 23:59:59",
        Granularity::OneDay,
        vec![Dimension::User, Dimension::App],
        None,
        Some(app_filter),
    );

    let (combined, _) = run_query(full.path(), &both, 2).await.unwrap();
    let (sequential, _) = run_query(user_only.path(), &staged, 2).await.unwrap();

    assert_eq!(combined.entries, sequential.entries);
}

#[tokio::test]
async fn test_dimension_order_changes_columns_not_values() {
    let logs = TempDir::new().unwrap();
    let results = TempDir::new().unwrap();
    seed_dataset(logs.path());

    let ua = query(
        "2025-01-01 00:00:00",
        "2025-01-03 23:59:59",
        Granularity::OneDay,
        vec![Dimension::User, Dimension::App],
        None,
        None,
    );
    let au = query(
        "2025-01-01 00:00:00",
        "2025-01-03 23:59:59",
        Granularity::OneDay,
        vec![Dimension::App, Dimension::User],
        None,
        None,
    );

    let (ua_result, _) = run_query(logs.path(), &ua, 2).await.unwrap();
    let (au_result, _) = run_query(logs.path(), &au, 2).await.unwrap();

    let ua_out = results.path().join("ua.csv");
    let au_out = results.path().join("au.csv");
    write_results(&ua_result, GroupBy::from_dimensions(&ua.dimensions), &ua_out).unwrap();
    write_results(&au_result, GroupBy::from_dimensions(&au.dimensions), &au_out).unwrap();

    // Normalize each data row to (window, user, app, rest) and compare sets.
    let normalize = |path: &Path, user_idx: usize, app_idx: usize| -> Vec<Vec<String>> {
        let content = fs::read_to_string(path).unwrap();
        let mut rows: Vec<Vec<String>> = content
            .lines()
            .skip(1)
            .map(|line| {
                let fields: Vec<&str> = line.split(',').collect();
                let mut row = vec![
                    fields[0].to_string(),
                    fields[user_idx].to_string(),
                    fields[app_idx].to_string(),
                ];
                row.extend(fields[3..].iter().map(|f| f.to_string()));
                row
            })
            .collect();
        rows.sort();
        rows
    };

    let ua_header = fs::read_to_string(&ua_out).unwrap();
    let au_header = fs::read_to_string(&au_out).unwrap();
    assert!(ua_header.starts_with("window_start,user,app,"));
    assert!(au_header.starts_with("window_start,app,user,"));

    assert_eq!(normalize(&ua_out, 1, 2), normalize(&au_out, 2, 1));
}

#[tokio::test]
async fn test_boundary_day_files_included_rows_filtered() {
    // The query covers only part of the first and last days; those files
    // are still read, with out-of-range rows dropped individually.
    let logs = TempDir::new().unwrap();
    seed_dataset(logs.path());

    let q = query(
        "2025-01-01 14:00:00",
        "2025-01-03 12:00:00",
        Granularity::OneDay,
        vec![Dimension::User],
        None,
        None,
    );
    let (result, stats) = run_query(logs.path(), &q, 2).await.unwrap();

    assert_eq!(stats.files_processed, 3);
    // In range: the two 14:2x/14:30 rows on day 1, both day-2 rows, and the
    // 12:00:00 row on day 3 (inclusive end). The 12:00:01 row is out.
    assert_eq!(stats.rows_matched, 5);
    assert_eq!(stats.rows_read, 8);

    let total_rows: u64 = result.entries.values().map(|acc| acc.rows).sum();
    assert_eq!(total_rows, 5);
}

#[tokio::test]
async fn test_empty_match_produces_header_only_file() {
    let logs = TempDir::new().unwrap();
    let results = TempDir::new().unwrap();
    seed_dataset(logs.path());

    let q = query(
        "2025-01-01 00:00:00",
        "2025-01-03 23:59:59",
        Granularity::OneDay,
        vec![Dimension::User],
        Some("nobody"),
        None,
    );
    let (result, _) = run_query(logs.path(), &q, 2).await.unwrap();
    assert!(result.is_empty());

    let out = results.path().join("result.csv");
    write_results(&result, GroupBy::from_dimensions(&q.dimensions), &out).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with("window_start,user,metric_1"));
}

#[tokio::test]
async fn test_thirty_minute_windows_in_output() {
    let logs = TempDir::new().unwrap();
    seed_dataset(logs.path());

    let q = query(
        "2025-01-01 00:00:00",
        "2025-01-01 23:59:59",
        Granularity::ThirtyMinutes,
        vec![Dimension::User],
        Some("user2"),
        None,
    );
    let (result, _) = run_query(logs.path(), &q, 1).await.unwrap();

    // 14:29:59 and 14:30:00 land in different windows.
    let windows: Vec<_> = result
        .entries
        .keys()
        .map(|(window, _)| window.format("%H:%M:%S").to_string())
        .collect();
    assert_eq!(windows, vec!["14:00:00", "14:30:00"]);
}
