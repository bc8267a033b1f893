use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const USAGE_TAIL: &str = "<data.csv> <plot-title> <x-label> <y-label> <output>";

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sizetime_plot"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run binary")
}

fn expected_usage() -> String {
    let stem = Path::new(env!("CARGO_BIN_EXE_sizetime_plot"))
        .file_stem()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    format!("{} {}\n", stem, USAGE_TAIL)
}

#[test]
fn wrong_argument_count_prints_usage_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    for args in [
        vec![],
        vec!["data.csv"],
        vec!["data.csv", "t", "x", "y"],
        vec!["data.csv", "t", "x", "y", "out.svg", "extra"],
    ]
    .iter()
    {
        let output = run(args, dir.path());
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), expected_usage());
    }
    // no file was touched
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn plots_and_overwrites_the_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "Size,Time\n1,10\n2,20\n3,15\n").unwrap();
    let args = ["data.csv", "Bench", "Size", "Time (ms)", "chart.png"];

    let first = run(&args, dir.path());
    assert!(first.status.success(), "{:?}", first);
    let chart = dir.path().join("chart.png");
    let png = fs::read(&chart).unwrap();
    assert!(png.starts_with(b"\x89PNG"));

    let second = run(&args, dir.path());
    assert!(second.status.success(), "{:?}", second);
    assert!(fs::read(&chart).unwrap().starts_with(b"\x89PNG"));
}

#[test]
fn odd_labels_do_not_change_control_flow() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "Time,Size,Note\n0.5,8,a\n0.7,16,b\n").unwrap();
    let output = run(
        &["data.csv", "", "--help", "<&>\"é%s{}", "chart.svg"],
        dir.path(),
    );
    assert!(output.status.success(), "{:?}", output);
    assert!(!String::from_utf8_lossy(&output.stdout).contains(USAGE_TAIL));
    assert!(dir.path().join("chart.svg").exists());
}

#[test]
fn missing_time_column_fails_without_usage() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "Size,Duration\n1,10\n").unwrap();
    let output = run(&["data.csv", "t", "x", "y", "chart.svg"], dir.path());
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains(USAGE_TAIL));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Time"));
    assert!(!dir.path().join("chart.svg").exists());
}

#[test]
fn nonexistent_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["nope.csv", "t", "x", "y", "chart.svg"], dir.path());
    assert!(!output.status.success());
    assert!(!dir.path().join("chart.svg").exists());
}

#[test]
fn unwritable_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "Size,Time\n1,10\n").unwrap();
    let output = run(
        &["data.csv", "t", "x", "y", "no/such/dir/chart.svg"],
        dir.path(),
    );
    assert!(!output.status.success());
}
