#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::{ORDERS_HEADER, SUBMISSIONS_HEADER, write_temp};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_payment_state_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: charge order 1001
    let orders = write_temp(&[ORDERS_HEADER, "1001,wc_order_1001,10.00,USD"]);
    let submissions = write_temp(&[SUBMISSIONS_HEADER, "1001,,tok_valid,,,,,,,"]);

    let mut cmd1 = Command::new(cargo_bin!("cardgate"));
    cmd1.args(["--simulate", "--settings", "tests/fixtures/settings.json"])
        .arg("--db-path")
        .arg(&db_path)
        .arg("submit")
        .arg(submissions.path())
        .arg("--orders")
        .arg(orders.path());

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1001,success,"));

    // 2. Second run: list orders from the same DB without reloading them
    let mut cmd2 = Command::new(cargo_bin!("cardgate"));
    cmd2.arg("--db-path").arg(&db_path).arg("orders");

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("1001,processing,ch_sim_000001,true,0.59"));

    // 3. Third run: a repeated submission is refused without a second charge
    let mut cmd3 = Command::new(cargo_bin!("cardgate"));
    cmd3.args(["--simulate", "--settings", "tests/fixtures/settings.json"])
        .arg("--db-path")
        .arg(&db_path)
        .arg("submit")
        .arg(submissions.path());

    let output3 = cmd3.output().expect("Failed to execute command");
    assert!(output3.status.success());
    let stdout3 = String::from_utf8_lossy(&output3.stdout);
    assert!(stdout3.contains("1001,failure,,This order has already been paid."));
}
