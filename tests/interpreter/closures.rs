use crate::helpers::execute;
use insta::assert_display_snapshot;

#[test]
fn closures_capture_their_own_independent_state() {
    let source = r#"fun makeCounter() {
    var count = 0;
    fun counter() {
        count = count + 1;
        return count;
    }
    return counter;
}
var a = makeCounter();
var b = makeCounter();
print a();
print a();
print b();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    1
    2
    1
    "###);
}

#[test]
fn lambda_expressions_capture_the_enclosing_scope() {
    let source = r#"fun adder(n) {
    return fun (x) { return x + n; };
}
var addFive = adder(5);
print addFive(10);"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    15
    "###);
}

#[test]
fn recursive_function_calls_itself_by_name() {
    let source = r#"fun fib(n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}
print fib(10);"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    55
    "###);
}

#[test]
fn mutually_recursive_top_level_functions_see_each_other() {
    // `isEven` is declared before `isOdd` but its body refers to `isOdd`,
    // which doesn't exist yet at the moment `isEven`'s declaration runs.
    let source = r#"fun isEven(n) {
    if (n == 0) return true;
    return isOdd(n - 1);
}
fun isOdd(n) {
    if (n == 0) return false;
    return isEven(n - 1);
}
print isEven(10);
print isOdd(10);"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    true
    false
    "###);
}

#[test]
fn a_function_can_reference_a_global_declared_later_in_the_file() {
    let source = r#"fun greet() {
    print greeting;
}
var greeting = "hi";
greet();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    hi
    "###);
}
