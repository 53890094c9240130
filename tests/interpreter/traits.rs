use crate::helpers::{execute, try_execute};
use insta::assert_display_snapshot;

#[test]
fn class_uses_methods_from_a_trait() {
    let source = r#"trait Greets {
    hello() {
        return "Hello, " + this.name + "!";
    }
}
class Person {
    use Greets;
    init(name) {
        this.name = name;
    }
}
print Person("Ada").hello();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    Hello, Ada!
    "###);
}

#[test]
fn a_class_method_overrides_a_trait_method_of_the_same_name_without_error() {
    let source = r#"trait Greets {
    hello() {
        return "generic hello";
    }
}
class Person {
    use Greets;
    hello() {
        return "specific hello";
    }
}
print Person().hello();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    specific hello
    "###);
}

#[test]
fn using_two_traits_with_a_clashing_method_name_is_a_runtime_error() {
    let source = r#"trait A {
    greet() {
        return "a";
    }
}
trait B {
    greet() {
        return "b";
    }
}
class C {
    use A, B;
}"#;
    let (_, result) = try_execute(source);
    match result {
        Err(jlox::ExecuteRawError::RuntimeError(e)) => {
            assert!(e.to_string().contains("greet"));
        }
        other => panic!("expected a runtime error about the duplicate method, got {other:?}"),
    }
}

#[test]
fn a_trait_can_use_another_trait() {
    let source = r#"trait Named {
    who() {
        return "a thing";
    }
}
trait Describable {
    use Named;
    describe() {
        return "I am " + this.who();
    }
}
class Thing {
    use Describable;
}
print Thing().describe();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    I am a thing
    "###);
}
