//! Tests for the init command

use crate::common::CliTestRunner;
use schemadiff::config::{Config, SideConfig};
use schemadiff::SchemadiffError;

#[test]
fn test_init_writes_loadable_template() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);

    let config = Config::load(&runner.fixture().config_path()).unwrap();
    assert_eq!(config.mismatch_limit, 30);
    assert_eq!(config.sort_column, "endtime");
    assert!(matches!(config.left, SideConfig::Postgres { port: 5434, .. }));
    assert!(matches!(config.right, SideConfig::Postgres { port: 5433, .. }));
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);

    let err = runner.expect_failure(&["init"]);
    assert!(matches!(err, SchemadiffError::Config { .. }));

    runner.expect_success(&["init", "--force"]);
}
