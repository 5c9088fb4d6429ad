use std::fs;
use std::path::Path;
use stream_etl::mockgen::generate_mock_data;
use stream_etl::{run, DigestAlgorithm, PipelineConfig};
use tempfile::TempDir;

fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        input: dir.join("raw_data.csv"),
        blocklist: dir.join("blocked_ids.txt"),
        output: dir.join("output.csv"),
        ..PipelineConfig::default()
    }
}

fn setup(input: &str, blocklist: Option<&str>) -> (TempDir, PipelineConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.input, input).unwrap();
    if let Some(ids) = blocklist {
        fs::write(&config.blocklist, ids).unwrap();
    }
    (dir, config)
}

#[test]
fn test_blocked_row_removed_in_order() {
    let input = "id,name,status\n101,A,active\n102,B,active\n103,C,active\n";
    let (_dir, config) = setup(input, Some("102\n"));

    let report = run(&config).unwrap();
    let output = fs::read_to_string(&config.output).unwrap();

    assert_eq!(output, "101,A,active\n103,C,active\n");
    assert_eq!(report.rows_sampled, 3);
    assert_eq!(report.rows_blocked, 1);
    assert_eq!(report.rows_written, 2);
}

#[test]
fn test_empty_blocklist_file_keeps_everything() {
    let input = "id,name,status\n103,C,active\n101,A,active\n102,B,active\n";
    let (_dir, config) = setup(input, Some(""));

    run(&config).unwrap();

    let output = fs::read_to_string(&config.output).unwrap();
    assert_eq!(output, "103,C,active\n101,A,active\n102,B,active\n");
}

#[test]
fn test_missing_blocklist_keeps_sampled_rows() {
    let input = "id,name,status\n101,A,active\n102,B,active\n103,C,active\n104,D,active\n";
    let (_dir, mut config) = setup(input, None);
    config.stride = 2;

    let report = run(&config).unwrap();

    assert_eq!(report.rows_blocked, 0);
    let output = fs::read_to_string(&config.output).unwrap();
    assert_eq!(output, "102,B,active\n104,D,active\n");
}

#[test]
fn test_stride_counts_blank_lines() {
    let input = "id,name,status\n101,A,active\n\n103,C,active\n104,D,active\n\n106,F,active\n";
    let (_dir, mut config) = setup(input, Some("106\n"));
    config.stride = 2;

    let report = run(&config).unwrap();

    // Positions 2 and 5 are blank, 4 is written and 6 is blocked
    assert_eq!(report.rows_sampled, 2);
    assert_eq!(report.rows_blocked, 1);
    let output = fs::read_to_string(&config.output).unwrap();
    assert_eq!(output, "104,D,active\n");
}

#[test]
fn test_missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = run(&config).unwrap_err();

    assert!(err.is_not_found());
    assert!(!config.output.exists());
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.stride = 3;
    config.digest = Some(DigestAlgorithm::Sha256);
    generate_mock_data(&config.input, 500).unwrap();
    fs::write(&config.blocklist, "103\n106\n400\n").unwrap();

    let first = run(&config).unwrap();
    let first_bytes = fs::read(&config.output).unwrap();
    let second = run(&config).unwrap();
    let second_bytes = fs::read(&config.output).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert!(first.checksum.is_some());
    assert_eq!(first.checksum, second.checksum);
}

#[test]
fn test_written_equals_sampled_minus_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.stride = 7;
    generate_mock_data(&config.input, 1000).unwrap();
    // 107 and 114 are sampled (lines 7 and 14), 108 is not
    fs::write(&config.blocklist, "107\n114\n108\n").unwrap();

    let report = run(&config).unwrap();
    let output = fs::read_to_string(&config.output).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(report.rows_sampled, 1000 / 7);
    assert_eq!(report.rows_blocked, 2);
    assert_eq!(report.rows_written, report.rows_sampled - report.rows_blocked);
    assert_eq!(lines.len(), report.rows_written);

    // Only positions that are multiples of the stride ever reach the output
    for line in lines {
        let id: usize = line.split(',').next().unwrap().parse().unwrap();
        assert_eq!((id - 100) % 7, 0);
    }
}
