use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn piped_session_adds_and_reports() {
    let temp = tempdir().unwrap();
    let input = "1\n100\nSalary\n2024-05-01\nMay pay\n1\n\
                 1\n30\nFood\n2024-05-02\nGroceries, weekly\n0\n\
                 4\n2024-05\n6\n";

    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.current_dir(temp.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Transaction added successfully."))
        .stdout(contains("Transactions for 2024-05:"))
        .stdout(contains("Net: 70.00"))
        .stdout(contains("Exiting program. Goodbye!"));

    let csv = std::fs::read_to_string(temp.path().join("transactions.csv")).unwrap();
    assert_eq!(
        csv,
        "2024-05-01,Salary,100.00,May pay,1\n2024-05-02,Food,30.00,\"Groceries, weekly\",0\n"
    );
}

#[test]
fn config_file_selects_ledger_and_sync_policy() {
    let temp = tempdir().unwrap();
    std::fs::write(
        temp.path().join("pocket_ledger.json"),
        r#"{ "ledger_file": "books/ledger.csv", "sync_policy": "on_exit" }"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.current_dir(temp.path())
        .write_stdin("1\n12.345\nBooks\n2024-06-01\nNovel\n0\n2\n")
        .assert()
        .success()
        .stdout(contains("Current Balance: -12.35"));

    let csv = std::fs::read_to_string(temp.path().join("books/ledger.csv")).unwrap();
    assert_eq!(csv, "2024-06-01,Books,12.35,Novel,0\n");
}

#[test]
fn unreadable_ledger_exits_with_error() {
    let temp = tempdir().unwrap();
    std::fs::create_dir_all(temp.path().join("transactions.csv")).unwrap();

    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.current_dir(temp.path())
        .write_stdin("6\n")
        .assert()
        .failure()
        .stderr(contains("Error:"));
}
