//! `freezer completion <shell>` prints a script covering the inventory commands.

use predicates::prelude::*;
use rstest::rstest;

mod common;

#[rstest]
#[case("bash")]
#[case("zsh")]
#[case("fish")]
fn test_completion_covers_inventory_commands(#[case] shell: &str) {
    let ctx = common::freezer();
    let script = ctx.run(&["completion", shell]);

    for command in ["box", "sample", "search", "export"] {
        assert!(script.contains(command), "{shell} script lacks '{command}'");
    }
    // Nested sample operations are completed too.
    for command in ["archive", "mv", "cp"] {
        assert!(script.contains(command), "{shell} script lacks 'sample {command}'");
    }
}

#[test]
fn test_completion_leaves_home_untouched() {
    let ctx = common::freezer();
    ctx.run(&["completion", "bash"]);

    let entries = std::fs::read_dir(ctx.home.path()).expect("read home").count();
    assert_eq!(entries, 0);
}

#[test]
fn test_completion_rejects_unknown_shell() {
    let ctx = common::freezer();
    ctx.new_cmd()
        .args(["completion", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tcsh"));
}

#[test]
fn test_completion_hidden_from_help() {
    let ctx = common::freezer();
    let help = ctx.run(&["--help"]);
    assert!(help.contains("sample"));
    assert!(!help.contains("completion"));
}
