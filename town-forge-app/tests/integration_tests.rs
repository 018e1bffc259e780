use predicates::prelude::*; // Used for writing assertions
use std::fs;
use assert_cmd::Command; // Run programs
use tempfile::tempdir; // Create temporary directories for testing

fn write_script(dir: &tempfile::TempDir, filename: &str, content: &str) -> std::path::PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("Failed to write script file");
    file_path
}

#[test]
fn test_script_builds_and_saves_snapshot() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let script = write_script(
        &tmp_dir,
        "town.txt",
        r#"
        # a house in the corner, then a name for it
        select 0 0 8 8
        house width=4 height=4 doors=1 windows=1
        name "Corner House"
        describe
        "#,
    );
    let output_file = tmp_dir.path().join("town.json");

    let mut cmd = Command::cargo_bin("town-forge")?;
    cmd.env("RUST_LOG", "info");
    cmd.arg("--script")
        .arg(&script)
        .arg("--seed")
        .arg("7")
        .arg("--width")
        .arg("16")
        .arg("--height")
        .arg("12")
        .arg("--output-path")
        .arg(&output_file);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("House added. at:"))
        .stdout(predicate::str::contains("Layer \"Corner House\" created."))
        .stdout(predicate::str::contains("There is a"))
        .stderr(predicate::str::contains("Town Forge finished."));

    let snapshot = fs::read_to_string(&output_file)?;
    assert!(snapshot.contains("\"Corner House\""));
    assert!(snapshot.contains("\"width\": 16"));
    Ok(())
}

#[test]
fn test_commands_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("town-forge")?;
    cmd.arg("--seed").arg("1");
    cmd.write_stdin("house\nselect 2 2 6 6\nfence width=4 height=4\nundo\nundo\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Error: No selection."))
        .stdout(predicate::str::contains("Fence added successfully"))
        .stdout(predicate::str::contains("undid last task"))
        .stdout(predicate::str::contains("Nothing to undo."));
    Ok(())
}

#[test]
fn test_text_output_uses_layered_settings() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let output_file = tmp_dir.path().join("rows.txt");

    let mut cmd = Command::cargo_bin("town-forge")?;
    cmd.env("TOWN_FORGE_WIDTH", "7");
    cmd.arg("--height")
        .arg("3")
        .arg("--output-path")
        .arg(&output_file);
    cmd.write_stdin("");
    cmd.assert().success();

    let text = fs::read_to_string(&output_file)?;
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.split(' ').count() == 7));
    Ok(())
}

#[test]
fn test_missing_script_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("town-forge")?;
    cmd.arg("--script").arg("definitely/not/here.txt");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open script"));
    Ok(())
}

#[test]
fn test_invalid_tie_break_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("town-forge")?;
    cmd.arg("--tie-break").arg("coin-flip");
    cmd.assert().failure();
    Ok(())
}
