use crate::helpers::try_execute;

#[test]
fn reading_an_uninitialized_variable_is_a_runtime_error() {
    let source = r#"var a;
print a + 1;"#;
    let (output, result) = try_execute(source);
    assert_eq!(output, "");
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn dividing_by_zero_is_a_runtime_error() {
    let source = "print 1 / 0;";
    let (_, result) = try_execute(source);
    match result {
        Err(jlox::ExecuteRawError::RuntimeError(e)) => {
            assert!(e.to_string().to_lowercase().contains("zero"));
        }
        other => panic!("expected a division-by-zero runtime error, got {other:?}"),
    }
}

#[test]
fn calling_a_function_with_the_wrong_number_of_arguments_is_a_runtime_error() {
    let source = r#"fun add(a, b) { return a + b; }
add(1);"#;
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    let source = r#"var x = 5;
x();"#;
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn getting_a_property_off_a_non_instance_is_a_runtime_error() {
    let source = r#"var x = 5;
print x.field;"#;
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn setting_a_property_off_a_non_instance_is_a_runtime_error() {
    let source = r#"var x = 5;
x.field = 1;"#;
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn reading_an_undefined_property_is_a_runtime_error() {
    let source = r#"class Foo {}
print Foo().bar;"#;
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn break_outside_a_loop_is_rejected_before_execution() {
    let source = "break;";
    let (_, result) = try_execute(source);
    assert!(!matches!(result, Ok(())));
}

#[test]
fn referencing_an_undeclared_global_is_a_runtime_error() {
    // Globals are resolved optimistically (any top-level name might be
    // declared later in the file, or never at all) so this only surfaces
    // once the interpreter actually looks the binding up.
    let source = "print undeclared;";
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::RuntimeError(_))
    ));
}

#[test]
fn assigning_to_an_undeclared_name_is_a_resolve_error() {
    let source = "undeclared = 5;";
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::ResolveError(_))
    ));
}

#[test]
fn reading_a_local_variable_in_its_own_initializer_is_a_resolve_error() {
    let source = r#"{
    var a = a;
}"#;
    let (_, result) = try_execute(source);
    assert!(matches!(
        result,
        Err(jlox::ExecuteRawError::ResolveError(_))
    ));
}
