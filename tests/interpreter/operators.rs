use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn ternary_operator_picks_a_branch() {
    let source = r#"print 5 > 3 ? "yes" : "no";
print 5 < 3 ? "yes" : "no";"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    yes
    no
    "###);
}

#[test]
fn ternary_operator_is_right_associative() {
    let source = r#"var grade = 65;
print grade >= 90 ? "A" : grade >= 80 ? "B" : grade >= 70 ? "C" : "F";"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    F
    "###);
}

#[test]
fn comma_operator_evaluates_every_operand_and_yields_the_last() {
    let source = r#"fun track(n) {
    print n;
    return n;
}
print (track(1), track(2), track(3));"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    1
    2
    3
    3
    "###);
}

#[test]
fn assignment_is_right_associative() {
    let source = r#"var a = 0;
var b = 0;
a = b = 7;
print a;
print b;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    7
    7
    "###);
}

#[test]
fn logical_operators_short_circuit() {
    let source = r#"fun loud(n) {
    print n;
    return n;
}
print false and loud("should not print");
print true or loud("should not print");"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    false
    true
    "###);
}

#[test]
fn plus_stringifies_the_other_operand_when_either_side_is_a_string() {
    let source = r#"var a = "x";
print a + 1;
print 1 + a;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    x1
    1x
    "###);
}

#[test]
fn strings_and_booleans_compare_lexicographically_and_false_before_true() {
    let source = r#"print "apple" < "banana";
print "banana" < "apple";
print false < true;
print true < false;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    false
    true
    false
    "###);
}

#[test]
fn comparing_across_types_is_a_runtime_error() {
    use crate::helpers::try_execute;
    let (_, result) = try_execute(r#"print 1 < "1";"#);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn nested_block_comments_are_skipped() {
    let source = r#"/* outer /* inner */ still outer */
print "after comment";"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    after comment
    "###);
}
