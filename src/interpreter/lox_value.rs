use crate::resolver::resolved_ast::FunctionDeclarationStatement;
use crate::resolver::BindingId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub(super) enum LoxValue {
    Boolean(bool),
    Null,
    /// Distinct from `Null`: the value of a `var` declared with no
    /// initializer, before it's ever assigned. Reading it is a runtime error.
    Undefined,
    String(String),
    Number(f64),
    Function(Rc<RefCell<Function>>),
    NativeFunction(Rc<NativeFunction>),
    Class(Rc<RefCell<Class>>),
    Trait(Rc<RefCell<Trait>>),
    Instance(Rc<RefCell<Instance>>),
}

impl LoxValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Boolean(false))
    }

    pub fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::String(s), Self::String(r)) => s == r,
            (Self::Boolean(s), Self::Boolean(r)) => s == r,
            (Self::Number(s), Self::Number(r)) => s == r,
            (Self::Instance(s), Self::Instance(r)) => Rc::ptr_eq(s, r),
            (Self::Class(s), Self::Class(r)) => Rc::ptr_eq(s, r),
            (_, _) => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LoxValue::Boolean(_) => "boolean",
            LoxValue::Null => "nil",
            LoxValue::Undefined => "undefined",
            LoxValue::String(_) => "string",
            LoxValue::Number(_) => "number",
            LoxValue::Function(_) | LoxValue::NativeFunction(_) => "function",
            LoxValue::Class(_) => "class",
            LoxValue::Trait(_) => "trait",
            LoxValue::Instance(_) => "instance",
        }
    }
}

impl Display for LoxValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoxValue::Boolean(b) => b.fmt(f),
            LoxValue::Null => write!(f, "nil"),
            LoxValue::Undefined => write!(f, "undefined"),
            LoxValue::String(s) => s.fmt(f),
            LoxValue::Number(n) => {
                // `-0.0 == 0.0` under IEEE-754, so this catches both signs
                // without disturbing normal number formatting.
                if *n == 0.0 {
                    write!(f, "0")
                } else {
                    n.fmt(f)
                }
            }
            LoxValue::Function(function) => function.borrow().fmt(f),
            LoxValue::NativeFunction(function) => write!(f, "<native fn {}>", function.name),
            LoxValue::Class(class) => write!(f, "{}", class.borrow().name),
            LoxValue::Trait(t) => write!(f, "<trait {}>", t.borrow().name),
            LoxValue::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class.borrow().name)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct Function {
    pub(super) name: String,
    pub(super) definition: Rc<FunctionDeclarationStatement>,
    pub(super) captured_environment: HashMap<BindingId, Rc<RefCell<LoxValue>>>,
}

impl Function {
    /// Returns a copy of this function whose closure additionally maps
    /// `this` (and `super`, if the method was resolved with one) onto the
    /// given values. Used for instance methods, class methods (bound to the
    /// class object) and trait methods merged into a class.
    pub fn bind(&self, this: LoxValue, superclass: Option<LoxValue>) -> Function {
        let mut captured_environment = self.captured_environment.clone();
        if let Some(this_binding_id) = self.definition.this_binding_id {
            captured_environment.insert(this_binding_id, Rc::new(RefCell::new(this)));
        }
        if let (Some(super_binding_id), Some(superclass)) =
            (self.definition.super_binding_id, superclass)
        {
            captured_environment.insert(super_binding_id, Rc::new(RefCell::new(superclass)));
        }
        Function {
            name: self.name.clone(),
            definition: Rc::clone(&self.definition),
            captured_environment,
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

pub(super) struct NativeFunction {
    pub name: &'static str,
    pub arity: u8,
    pub func: fn(Vec<LoxValue>) -> Result<LoxValue, crate::interpreter::RuntimeError>,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

#[derive(Debug, Clone)]
pub(super) struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    /// Instance methods, getters and the initializer, keyed by name. Trait
    /// methods merged in lose to a class method of the same name.
    pub methods: HashMap<String, Rc<Function>>,
    /// `class`-prefixed methods, called directly on the class object.
    pub class_methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|s| s.borrow().find_method(name))
        })
    }

    pub fn find_class_method(&self, name: &str) -> Option<Rc<Function>> {
        self.class_methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|s| s.borrow().find_class_method(name))
        })
    }
}

#[derive(Debug, Clone)]
pub(super) struct Trait {
    pub name: String,
    pub methods: HashMap<String, Rc<Function>>,
}

#[derive(Debug, Clone)]
pub(super) struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, LoxValue>,
}
