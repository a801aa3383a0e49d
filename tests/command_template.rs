// tests/command_template.rs

use proptest::prelude::*;

use testrun::errors::RunnerError;
use testrun::runner::format::{format_argv, format_command, CommandTemplate};

#[test]
fn no_template_returns_executable_unchanged() {
    assert_eq!(format_command(None, "bin/test1"), "bin/test1");
    assert_eq!(format_argv(None, "bin/test1"), vec!["bin/test1".to_string()]);
}

#[test]
fn wrap_template_substitutes_executable() {
    let t = CommandTemplate::parse("wrap %s").unwrap();
    assert_eq!(format_command(Some(&t), "bin/test1"), "wrap bin/test1");
    assert_eq!(t.argv("bin/test1"), vec!["wrap", "bin/test1"]);
}

#[test]
fn valgrind_style_template_keeps_flags() {
    let t = CommandTemplate::parse("valgrind --error-exitcode=1 --tool=memcheck %s").unwrap();
    assert_eq!(
        t.argv("/build/test_foo"),
        vec!["valgrind", "--error-exitcode=1", "--tool=memcheck", "/build/test_foo"]
    );
}

#[test]
fn placeholder_inside_a_word() {
    let t = CommandTemplate::parse("runner --exe=%s --quiet").unwrap();
    assert_eq!(t.argv("a/b"), vec!["runner", "--exe=a/b", "--quiet"]);
}

#[test]
fn executable_with_spaces_stays_one_argument() {
    let t = CommandTemplate::parse("wrap %s").unwrap();
    let argv = t.argv("/tmp/my build/test one");
    assert_eq!(argv, vec!["wrap", "/tmp/my build/test one"]);
    assert_eq!(t.render("/tmp/my build/test one"), "wrap /tmp/my build/test one");
}

#[test]
fn escaped_percent_is_literal() {
    let t = CommandTemplate::parse("time -f 100%% %s").unwrap();
    assert_eq!(t.argv("x"), vec!["time", "-f", "100%", "x"]);
}

#[test]
fn render_keeps_template_whitespace() {
    let t = CommandTemplate::parse("env  X=1\t%s").unwrap();
    assert_eq!(t.render("bin/test1"), "env  X=1\tbin/test1");
    assert_eq!(t.argv("bin/test1"), vec!["env", "X=1", "bin/test1"]);

    let t = CommandTemplate::parse("  nice -n%%5 %s ").unwrap();
    assert_eq!(format_command(Some(&t), "x"), "  nice -n%5 x ");
}

fn assert_invalid(template: &str, needle: &str) {
    match CommandTemplate::parse(template) {
        Err(RunnerError::InvalidTemplate { template: t, reason }) => {
            assert_eq!(t, template);
            assert!(
                reason.contains(needle),
                "reason {reason:?} should mention {needle:?}"
            );
        }
        Err(e) => panic!("expected InvalidTemplate, got {e:?}"),
        Ok(t) => panic!("expected {template:?} to be rejected, got {t:?}"),
    }
}

#[test]
fn template_without_placeholder_is_rejected() {
    assert_invalid("valgrind", "no %s");
    assert_invalid("", "no %s");
    assert_invalid("100%% sure", "no %s");
}

#[test]
fn template_with_two_placeholders_is_rejected() {
    assert_invalid("%s %s", "2 %s placeholders");
    assert_invalid("cp %s %s.bak", "2 %s placeholders");
}

#[test]
fn unknown_directive_is_rejected() {
    assert_invalid("wrap %d %s", "'%d'");
    assert_invalid("wrap %s %", "trailing '%'");
}

proptest! {
    // Any path without whitespace or '%' comes back verbatim, with or without
    // a pass-through template.
    #[test]
    fn identity_templates_preserve_path(path in "[a-zA-Z0-9_./-]{1,40}") {
        prop_assert_eq!(format_command(None, &path), path.clone());

        let t = CommandTemplate::parse("%s").unwrap();
        prop_assert_eq!(t.render(&path), path.clone());
        prop_assert_eq!(t.argv(&path), vec![path.clone()]);
    }

    #[test]
    fn wrapper_prefix_is_prepended(path in "[a-zA-Z0-9_./-]{1,40}") {
        let t = CommandTemplate::parse("wrap %s").unwrap();
        prop_assert_eq!(t.render(&path), format!("wrap {path}"));
    }
}
