use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn two_branch_conditional_works() {
    let source = r#"if (3 > 5) {
    print true;
} else {
    print false;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    false
    "###);
}

#[test]
fn single_branch_conditional_works() {
    let source = r#"if (5 > 2) {
    print true;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    "###);
}

#[test]
fn while_loop_with_continue_skips_the_rest_of_the_body() {
    let source = r#"var i = 0;
while (i < 5) {
    i = i + 1;
    if (i == 3) continue;
    print i;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    1
    2
    4
    5
    "###);
}

#[test]
fn break_exits_only_the_innermost_loop() {
    let source = r#"for (var i = 0; i < 3; i = i + 1) {
    for (var j = 0; j < 3; j = j + 1) {
        if (j == 1) break;
        print i;
        print j;
    }
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    0
    0
    1
    0
    2
    0
    "###);
}

#[test]
fn for_loop_continue_still_runs_the_increment() {
    let source = r#"for (var i = 0; i < 5; i = i + 1) {
    if (i == 2) continue;
    print i;
}"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    0
    1
    3
    4
    "###);
}

