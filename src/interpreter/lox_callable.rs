use super::lox_value::{Class, Function, Instance, LoxValue, NativeFunction};
use super::tree_walker::Flow;
use super::{Interpreter, RuntimeError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::iter::zip;
use std::rc::Rc;

pub(super) trait LoxCallable {
    fn arity(&self) -> u8;
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError>;
}

impl LoxCallable for Function {
    fn arity(&self) -> u8 {
        // Safe: the parser rejects more than 255 parameters.
        self.definition.parameters_binding_ids.len() as u8
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let mut function_local_bindings = HashMap::new();
        for (parameter, argument) in zip(self.definition.parameters_binding_ids.iter(), arguments) {
            function_local_bindings.insert(*parameter, Rc::new(RefCell::new(argument)));
        }
        for (captured_binding_id, captured_value) in self.captured_environment.iter() {
            function_local_bindings.insert(*captured_binding_id, Rc::clone(captured_value));
        }

        let previous_bindings = std::mem::replace(&mut interpreter.bindings, function_local_bindings);
        let previous_loop_depth = interpreter.loop_depth;
        interpreter.loop_depth = 0;

        let is_initializer = matches!(
            self.definition.kind,
            crate::parser::ast::FunctionKind::Initializer
        );
        let this_value = self
            .definition
            .this_binding_id
            .and_then(|id| interpreter.bindings.get(&id))
            .map(|cell| cell.borrow().clone());

        let mut result = Ok(LoxValue::Null);
        for statement in self.definition.body.clone() {
            match interpreter.execute(statement) {
                Ok(Flow::Normal) => continue,
                Ok(Flow::Return(value)) => {
                    result = Ok(value);
                    break;
                }
                Ok(Flow::Break) | Ok(Flow::Continue) => {
                    result = Err(RuntimeError::break_or_continue_outside_loop());
                    break;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        interpreter.bindings = previous_bindings;
        interpreter.loop_depth = previous_loop_depth;

        if is_initializer {
            return Ok(this_value.unwrap_or(LoxValue::Null));
        }
        result
    }
}

impl LoxCallable for NativeFunction {
    fn arity(&self) -> u8 {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        (self.func)(arguments)
    }
}

impl LoxCallable for Rc<RefCell<Class>> {
    fn arity(&self) -> u8 {
        self.borrow()
            .find_method("init")
            .map(|f| f.arity())
            .unwrap_or(0)
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let instance = Rc::new(RefCell::new(Instance {
            class: Rc::clone(self),
            fields: HashMap::new(),
        }));
        if let Some(initializer) = self.borrow().find_method("init") {
            let superclass = self
                .borrow()
                .superclass
                .as_ref()
                .map(|s| LoxValue::Class(Rc::clone(s)));
            let bound = initializer.bind(LoxValue::Instance(Rc::clone(&instance)), superclass);
            bound.call(interpreter, arguments)?;
        }
        Ok(LoxValue::Instance(instance))
    }
}
