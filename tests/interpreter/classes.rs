use crate::helpers::{execute, try_execute};
use insta::assert_display_snapshot;

#[test]
fn initializer_sets_fields_and_methods_read_them() {
    let source = r#"class Point {
    init(x, y) {
        this.x = x;
        this.y = y;
    }
    sum() {
        return this.x + this.y;
    }
}
var p = Point(3, 4);
print p.sum();
print p;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    7
    Point instance
    "###);
}

#[test]
fn getter_is_invoked_without_parentheses() {
    let source = r#"class Circle {
    init(radius) {
        this.radius = radius;
    }
    area {
        return 3.14159 * this.radius * this.radius;
    }
}
print Circle(2).area;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    12.56636
    "###);
}

#[test]
fn class_methods_are_callable_on_the_class_itself() {
    let source = r#"class Math {
    class square(n) {
        return n * n;
    }
}
print Math.square(5);"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    25
    "###);
}

#[test]
fn super_dispatches_this_dynamically_to_the_subclass_override() {
    let source = r#"class Animal {
    speak() {
        return "...";
    }
    describe() {
        return "Animal says " + this.speak();
    }
}
class Dog < Animal {
    speak() {
        return "Woof";
    }
    describe() {
        return super.describe() + "!";
    }
}
print Dog().describe();"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    Animal says Woof!
    "###);
}

#[test]
fn a_class_cannot_inherit_from_itself() {
    let source = "class Oops < Oops {}";
    let (_, result) = try_execute(source);
    assert!(matches!(result, Err(jlox::ExecuteRawError::ResolveError(_))));
}

#[test]
fn a_method_can_reference_its_own_class_by_name() {
    let source = r#"class Counter {
    init(n) {
        this.n = n;
    }
    next() {
        return Counter(this.n + 1);
    }
}
print Counter(0).next().n;"#;
    let output = execute(source);
    assert_display_snapshot!(output, @r###"
    1
    "###);
}
