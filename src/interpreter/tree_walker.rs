use super::lox_callable::LoxCallable;
use super::lox_value::{Class, Function, Instance, LoxValue, Trait};
use super::natives;
use crate::parser::ast::FunctionKind;
use crate::parser::Parser;
use crate::resolver::resolved_ast::{
    BinaryExpression, BlockStatement, CallExpression, ClassStatement, Expression,
    ExpressionStatement, ForStatement, GetExpression, IfElseStatement, LambdaExpression,
    LiteralExpression, LogicalExpression, PrintStatement, ReturnStatement, SetExpression,
    Statement, TernaryExpression, TraitStatement, UnaryExpression, VariableAssignmentExpression,
    VariableDeclarationStatement, WhileStatement,
};
use crate::resolver::{BindingId, Resolver};
use crate::scanner::{Scanner, Token, TokenDiscriminant};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::sync::Mutex;

pub struct Interpreter<'a> {
    pub(super) bindings: HashMap<BindingId, Rc<RefCell<LoxValue>>>,
    pub(super) loop_depth: u32,
    output_stream: Rc<Mutex<dyn Write + 'a>>,
}

/// What a statement did, threaded up through nested blocks/loops. Kept as a
/// distinct sum type rather than folding `break`/`continue` into the error
/// channel, since a loop needs to distinguish three non-error outcomes.
pub(super) enum Flow {
    Normal,
    Break,
    Continue,
    Return(LoxValue),
}

impl<'a> Interpreter<'a> {
    pub fn new<OutputStream>(output: OutputStream) -> Self
    where
        OutputStream: Write + 'a,
    {
        let mut bindings: HashMap<BindingId, Rc<RefCell<LoxValue>>> = HashMap::new();
        let native_values: [LoxValue; 3] = [
            LoxValue::NativeFunction(Rc::new(natives::clock())),
            LoxValue::NativeFunction(Rc::new(natives::input())),
            LoxValue::NativeFunction(Rc::new(natives::randint())),
        ];
        for (n, value) in native_values.into_iter().enumerate() {
            bindings.insert(
                BindingId::Predetermined(n as u64),
                Rc::new(RefCell::new(value)),
            );
        }
        Self {
            bindings,
            loop_depth: 0,
            output_stream: Rc::new(Mutex::new(output)),
        }
    }

    /// Scan, parse, resolve and then execute a Lox source file.
    #[tracing::instrument(level = "debug", skip(self, source), fields(source_len = source.len()))]
    pub fn execute_raw(&mut self, source: &str) -> Result<(), ExecuteRawError> {
        let statements = Parser::parse(Scanner::new(source)).map_err(|errors| {
            tracing::error!(count = errors.len(), "parse errors");
            ExecuteRawError::ParserError(errors)
        })?;
        tracing::debug!(count = statements.len(), "parsed statements");

        let mut resolver = Resolver::new();
        let statements = resolver.resolve(statements);
        resolver.finish().map_err(|errors| {
            tracing::error!(count = errors.len(), "resolve errors");
            ExecuteRawError::ResolveError(errors)
        })?;
        tracing::debug!("resolved statements");

        self.batch_execute(statements).map_err(|e| {
            tracing::error!(error = %e, "runtime error");
            ExecuteRawError::RuntimeError(e)
        })
    }

    /// Execute a series of statements, stopping at the first runtime error.
    pub fn batch_execute(&mut self, statements: Vec<Statement>) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute_top_level(statement)?;
        }
        Ok(())
    }

    fn execute_top_level(&mut self, statement: Statement) -> Result<(), RuntimeError> {
        match self.execute(statement)? {
            Flow::Normal => Ok(()),
            Flow::Return(_) => Err(RuntimeError::unexpected_return()),
            Flow::Break | Flow::Continue => Err(RuntimeError::break_or_continue_outside_loop()),
        }
    }

    pub(super) fn execute(&mut self, s: Statement) -> Result<Flow, RuntimeError> {
        match s {
            Statement::Expression(ExpressionStatement(e)) => {
                self.eval(e)?;
                Ok(Flow::Normal)
            }
            Statement::Print(PrintStatement(e)) => {
                let value = self.eval(e)?;
                let mut stream = self.output_stream.lock().unwrap();
                writeln!(stream, "{value}").map_err(RuntimeError::failed_to_print)?;
                stream.flush().map_err(RuntimeError::failed_to_flush)?;
                Ok(Flow::Normal)
            }
            Statement::VariableDeclaration(VariableDeclarationStatement {
                initializer,
                binding_id,
            }) => {
                let value = match initializer {
                    Some(initializer) => self.eval(initializer)?,
                    None => LoxValue::Undefined,
                };
                self.define(binding_id, value);
                Ok(Flow::Normal)
            }
            Statement::Block(BlockStatement(statements)) => self.execute_block(statements),
            Statement::IfElse(IfElseStatement {
                condition,
                if_branch,
                else_branch,
            }) => {
                if self.eval(condition)?.is_truthy() {
                    self.execute(*if_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(*else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Statement::While(WhileStatement { condition, body }) => {
                while self.eval(condition.clone())?.is_truthy() {
                    match self.execute((*body).clone())? {
                        Flow::Normal | Flow::Continue => continue,
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::For(ForStatement {
                initializer,
                condition,
                increment,
                body,
            }) => {
                if let Some(initializer) = initializer {
                    self.execute(*initializer)?;
                }
                loop {
                    let keep_going = match &condition {
                        Some(condition) => self.eval(condition.clone())?.is_truthy(),
                        None => true,
                    };
                    if !keep_going {
                        break;
                    }
                    match self.execute((*body).clone())? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                    }
                    if let Some(increment) = &increment {
                        self.eval(increment.clone())?;
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::Break(_) => Ok(Flow::Break),
            Statement::Continue(_) => Ok(Flow::Continue),
            Statement::FunctionDeclaration(statement) => {
                let name_binding_id = statement
                    .name_binding_id
                    .expect("top-level function declarations always carry a name binding id");
                let function = Rc::new(RefCell::new(Function {
                    name: statement.name.clone(),
                    definition: Rc::new(statement.clone()),
                    captured_environment: HashMap::new(),
                }));
                // Bind the name before computing captures, so a recursive
                // reference to itself inside the body finds a real cell.
                self.define(name_binding_id, LoxValue::Function(Rc::clone(&function)));
                let captured_environment = self.capture_environment(&statement.captured_binding_ids);
                function.borrow_mut().captured_environment = captured_environment;
                Ok(Flow::Normal)
            }
            Statement::Return(ReturnStatement { value, .. }) => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => LoxValue::Null,
                };
                Ok(Flow::Return(value))
            }
            Statement::Class(statement) => self.execute_class(statement),
            Statement::Trait(statement) => self.execute_trait(statement),
        }
    }

    fn execute_block(&mut self, statements: Vec<Statement>) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match self.execute(statement)? {
                Flow::Normal => continue,
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn make_function(
        &mut self,
        declaration: &crate::resolver::resolved_ast::FunctionDeclarationStatement,
    ) -> Function {
        Function {
            name: declaration.name.clone(),
            definition: Rc::new(declaration.clone()),
            captured_environment: self.capture_environment(&declaration.captured_binding_ids),
        }
    }

    /// Write `value` into the cell for `id`, creating the cell if needed.
    ///
    /// Globals (`Predetermined` ids) reuse whatever cell already sits at
    /// `id` rather than replacing it, because a closure declared earlier in
    /// the same file may have already captured that cell as a forward
    /// reference (mutual recursion between top-level functions, a function
    /// calling a global defined further down). Locals always get a fresh
    /// cell: each call frame starts from a clean `bindings` map, and each
    /// loop iteration re-running a `var` statement must produce its own
    /// cell so closures created in different iterations stay independent.
    fn define(&mut self, id: BindingId, value: LoxValue) {
        match id {
            BindingId::Predetermined(_) => {
                let cell = self
                    .bindings
                    .entry(id)
                    .or_insert_with(|| Rc::new(RefCell::new(LoxValue::Undefined)))
                    .clone();
                *cell.borrow_mut() = value;
            }
            BindingId::FunctionLocal(_) => {
                self.bindings.insert(id, Rc::new(RefCell::new(value)));
            }
        }
    }

    fn capture_environment(
        &mut self,
        captured_binding_ids: &[BindingId],
    ) -> HashMap<BindingId, Rc<RefCell<LoxValue>>> {
        captured_binding_ids
            .iter()
            .map(|id| {
                let cell = match id {
                    // A global might not have run its declaration yet (the
                    // capturing function was declared earlier in the file).
                    // Create a placeholder now; `define` will fill it in
                    // once the global's own declaration executes.
                    BindingId::Predetermined(_) => self
                        .bindings
                        .entry(*id)
                        .or_insert_with(|| Rc::new(RefCell::new(LoxValue::Undefined)))
                        .clone(),
                    BindingId::FunctionLocal(_) => {
                        Rc::clone(self.bindings.get(id).unwrap_or_else(|| {
                            panic!("closure references local binding {id} that isn't bound yet")
                        }))
                    }
                };
                (*id, cell)
            })
            .collect()
    }

    fn execute_class(&mut self, statement: ClassStatement) -> Result<Flow, RuntimeError> {
        let superclass = match statement.superclass {
            Some(superclass_ref) => {
                match self.lookup(superclass_ref.binding_id)?.borrow().clone() {
                    LoxValue::Class(class) => Some(class),
                    other => return Err(RuntimeError::superclass_not_a_class(other.type_name())),
                }
            }
            None => None,
        };

        let class_name = statement.name.lexeme();
        let mut methods = HashMap::new();
        for use_ref in &statement.uses {
            let used = self.lookup(use_ref.binding_id)?.borrow().clone();
            let used_trait = match used {
                LoxValue::Trait(t) => t,
                other => return Err(RuntimeError::not_a_trait(other.type_name())),
            };
            for (name, method) in used_trait.borrow().methods.iter() {
                if methods.insert(name.clone(), Rc::clone(method)).is_some() {
                    return Err(RuntimeError::duplicate_trait_method(&class_name, name));
                }
            }
        }

        // Bind the class's own name before resolving its methods' closures,
        // so a method that refers back to the class (e.g. a factory method
        // calling `ClassName()`) captures a real cell.
        let class = Rc::new(RefCell::new(Class {
            name: class_name.clone(),
            superclass,
            methods: HashMap::new(),
            class_methods: HashMap::new(),
        }));
        self.define(statement.name_binding_id, LoxValue::Class(Rc::clone(&class)));

        let mut class_methods = HashMap::new();
        for method in &statement.methods {
            let function = Rc::new(self.make_function(method));
            match method.kind {
                FunctionKind::ClassMethod => {
                    class_methods.insert(method.name.clone(), function);
                }
                _ => {
                    // Class methods always win over same-named trait methods.
                    methods.insert(method.name.clone(), function);
                }
            }
        }
        class.borrow_mut().methods = methods;
        class.borrow_mut().class_methods = class_methods;
        Ok(Flow::Normal)
    }

    fn execute_trait(&mut self, statement: TraitStatement) -> Result<Flow, RuntimeError> {
        let mut methods = HashMap::new();
        for use_ref in &statement.uses {
            let used = self.lookup(use_ref.binding_id)?.borrow().clone();
            let used_trait = match used {
                LoxValue::Trait(t) => t,
                other => return Err(RuntimeError::not_a_trait(other.type_name())),
            };
            for (name, method) in used_trait.borrow().methods.iter() {
                if methods.insert(name.clone(), Rc::clone(method)).is_some() {
                    return Err(RuntimeError::duplicate_trait_method(&statement.name, name));
                }
            }
        }
        for method in &statement.methods {
            let function = Rc::new(self.make_function(method));
            methods.insert(method.name.clone(), function);
        }

        let t = Rc::new(RefCell::new(Trait {
            name: statement.name,
            methods,
        }));
        self.define(statement.name_binding_id, LoxValue::Trait(t));
        Ok(Flow::Normal)
    }

    fn lookup(&self, id: BindingId) -> Result<Rc<RefCell<LoxValue>>, RuntimeError> {
        self.bindings
            .get(&id)
            .cloned()
            .ok_or_else(RuntimeError::unbound_variable)
    }

    /// Like `lookup`, but for a binding that came straight from a source
    /// identifier: a miss here is a user-facing "undefined variable" error,
    /// not an interpreter bug, so it's reported with the variable's name and
    /// line instead of the generic detached message.
    fn lookup_named(
        &self,
        id: BindingId,
        identifier: &Token,
    ) -> Result<Rc<RefCell<LoxValue>>, RuntimeError> {
        self.bindings
            .get(&id)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_variable(identifier.clone(), &identifier.lexeme()))
    }

    fn eval(&mut self, e: Expression) -> Result<LoxValue, RuntimeError> {
        match e {
            Expression::Binary(b) => self.eval_binary(b),
            Expression::Logical(b) => self.eval_logical(b),
            Expression::Unary(u) => self.eval_unary(u),
            Expression::Ternary(TernaryExpression {
                condition,
                then_branch,
                else_branch,
            }) => {
                if self.eval(*condition)?.is_truthy() {
                    self.eval(*then_branch)
                } else {
                    self.eval(*else_branch)
                }
            }
            Expression::Literal(l) => Ok(match l {
                LiteralExpression::Boolean(b) => LoxValue::Boolean(b),
                LiteralExpression::Null => LoxValue::Null,
                LiteralExpression::String(s) => LoxValue::String(s),
                LiteralExpression::Number(n) => LoxValue::Number(n),
            }),
            Expression::Grouping(g) => self.eval(*g.0),
            Expression::VariableReference(v) => {
                let value = self.lookup_named(v.binding_id, &v.identifier)?.borrow().clone();
                if let LoxValue::Undefined = value {
                    return Err(RuntimeError::read_before_initialization());
                }
                Ok(value)
            }
            Expression::VariableAssignment(VariableAssignmentExpression {
                binding_id,
                identifier,
                value,
            }) => {
                let value = self.eval(*value)?;
                *self.lookup_named(binding_id, &identifier)?.borrow_mut() = value.clone();
                Ok(value)
            }
            Expression::Call(c) => self.eval_call(c),
            Expression::Get(GetExpression { object, name }) => {
                let object = self.eval(*object)?;
                self.get_property(object, &name.lexeme())
            }
            Expression::Set(SetExpression {
                object,
                name,
                value,
            }) => {
                let object = self.eval(*object)?;
                let value = self.eval(*value)?;
                match object {
                    LoxValue::Instance(instance) => {
                        instance
                            .borrow_mut()
                            .fields
                            .insert(name.lexeme(), value.clone());
                        Ok(value)
                    }
                    other => Err(RuntimeError::not_an_instance(other.type_name())),
                }
            }
            Expression::This(t) => Ok(self.lookup(t.binding_id)?.borrow().clone()),
            Expression::Super(s) => {
                let superclass = match self.lookup(s.binding_id)?.borrow().clone() {
                    LoxValue::Class(c) => c,
                    other => return Err(RuntimeError::superclass_not_a_class(other.type_name())),
                };
                let method = superclass
                    .borrow()
                    .find_method(&s.method.lexeme())
                    .ok_or_else(|| RuntimeError::undefined_property(&s.method.lexeme()))?;
                // Look up `this` through the *calling* method's own binding,
                // not the superclass method's — those are distinct reserved
                // ids even though they both happen to be named "this".
                let this = self.lookup(s.this_binding_id)?.borrow().clone();
                let grandparent = superclass.borrow().superclass.clone().map(LoxValue::Class);
                let bound = method.bind(this, grandparent);
                Ok(LoxValue::Function(Rc::new(RefCell::new(bound))))
            }
            Expression::Lambda(LambdaExpression {
                parameters_binding_ids,
                body,
                captured_binding_ids,
            }) => {
                let definition = crate::resolver::resolved_ast::FunctionDeclarationStatement {
                    name: "lambda".to_string(),
                    name_binding_id: None,
                    parameters_binding_ids,
                    body,
                    kind: FunctionKind::Function,
                    captured_binding_ids,
                    this_binding_id: None,
                    super_binding_id: None,
                };
                let function = self.make_function(&definition);
                Ok(LoxValue::Function(Rc::new(RefCell::new(function))))
            }
        }
    }

    fn get_property(&mut self, object: LoxValue, name: &str) -> Result<LoxValue, RuntimeError> {
        match object {
            LoxValue::Instance(instance) => {
                if let Some(value) = instance.borrow().fields.get(name) {
                    return Ok(value.clone());
                }
                let class = Rc::clone(&instance.borrow().class);
                let method = class
                    .borrow()
                    .find_method(name)
                    .ok_or_else(|| RuntimeError::undefined_property(name))?;
                let superclass = class.borrow().superclass.clone().map(LoxValue::Class);
                let bound = method.bind(LoxValue::Instance(Rc::clone(&instance)), superclass);
                if matches!(method.definition.kind, FunctionKind::Getter) {
                    bound.call(self, vec![])
                } else {
                    Ok(LoxValue::Function(Rc::new(RefCell::new(bound))))
                }
            }
            LoxValue::Class(class) => {
                let method = class
                    .borrow()
                    .find_class_method(name)
                    .ok_or_else(|| RuntimeError::undefined_property(name))?;
                let bound = method.bind(LoxValue::Class(Rc::clone(&class)), None);
                Ok(LoxValue::Function(Rc::new(RefCell::new(bound))))
            }
            other => Err(RuntimeError::not_an_instance(other.type_name())),
        }
    }

    fn eval_call(&mut self, c: CallExpression) -> Result<LoxValue, RuntimeError> {
        let callee = self.eval(*c.callee)?;
        let arguments = c
            .arguments
            .into_iter()
            .map(|a| self.eval(a))
            .collect::<Result<Vec<_>, _>>()?;
        let n_arguments = arguments.len() as u8;
        match callee {
            LoxValue::Function(f) => {
                let arity = f.borrow().arity();
                if arity != n_arguments {
                    return Err(RuntimeError::arity_mismatch(arity, n_arguments));
                }
                let f = f.borrow();
                f.call(self, arguments)
            }
            LoxValue::NativeFunction(f) => {
                if f.arity() != n_arguments {
                    return Err(RuntimeError::arity_mismatch(f.arity(), n_arguments));
                }
                f.call(self, arguments)
            }
            LoxValue::Class(c) => {
                let arity = c.arity();
                if arity != n_arguments {
                    return Err(RuntimeError::arity_mismatch(arity, n_arguments));
                }
                c.call(self, arguments)
            }
            other => Err(RuntimeError::not_callable(other.type_name())),
        }
    }

    fn eval_logical(&mut self, b: LogicalExpression) -> Result<LoxValue, RuntimeError> {
        let left = self.eval(*b.left)?;
        match b.operator.discriminant() {
            TokenDiscriminant::Or if left.is_truthy() => Ok(left),
            TokenDiscriminant::Or => self.eval(*b.right),
            TokenDiscriminant::And if !left.is_truthy() => Ok(left),
            TokenDiscriminant::And => self.eval(*b.right),
            _ => Err(RuntimeError::new(b.operator, "Not a valid logical operator")),
        }
    }

    fn eval_binary(&mut self, b: BinaryExpression) -> Result<LoxValue, RuntimeError> {
        let BinaryExpression {
            left,
            operator,
            right,
        } = b;
        let left = self.eval(*left)?;
        let right = self.eval(*right)?;
        match operator.discriminant() {
            TokenDiscriminant::Minus => num_op(left, right, operator, |l, r| LoxValue::Number(l - r)),
            TokenDiscriminant::Plus => match (left, right) {
                (LoxValue::Number(l), LoxValue::Number(r)) => Ok(LoxValue::Number(l + r)),
                (LoxValue::String(l), LoxValue::String(r)) => Ok(LoxValue::String(l + &r)),
                // At least one string: concatenate after stringifying the other operand.
                (LoxValue::String(l), r) => Ok(LoxValue::String(format!("{l}{r}"))),
                (l, LoxValue::String(r)) => Ok(LoxValue::String(format!("{l}{r}"))),
                (_, _) => Err(RuntimeError::new(
                    operator,
                    "`+` operands must either be both numbers, or include a string",
                )),
            },
            TokenDiscriminant::Slash => {
                if let LoxValue::Number(r) = right {
                    if r == 0.0 {
                        return Err(RuntimeError::division_by_zero(operator));
                    }
                }
                num_op(left, right, operator, |l, r| LoxValue::Number(l / r))
            }
            TokenDiscriminant::Star => num_op(left, right, operator, |l, r| LoxValue::Number(l * r)),
            TokenDiscriminant::GreaterEqual => {
                compare(left, right, operator, std::cmp::Ordering::is_ge)
            }
            TokenDiscriminant::Greater => compare(left, right, operator, std::cmp::Ordering::is_gt),
            TokenDiscriminant::Less => compare(left, right, operator, std::cmp::Ordering::is_lt),
            TokenDiscriminant::LessEqual => {
                compare(left, right, operator, std::cmp::Ordering::is_le)
            }
            TokenDiscriminant::EqualEqual => Ok(LoxValue::Boolean(left.is_equal(&right))),
            TokenDiscriminant::BangEqual => Ok(LoxValue::Boolean(!left.is_equal(&right))),
            TokenDiscriminant::Comma => Ok(right),
            _ => Err(RuntimeError::new(operator, "Not a valid binary operator")),
        }
    }

    fn eval_unary(&mut self, u: UnaryExpression) -> Result<LoxValue, RuntimeError> {
        let UnaryExpression { operand, operator } = u;
        let value = self.eval(*operand)?;
        match operator.discriminant() {
            TokenDiscriminant::Minus => match value {
                LoxValue::Number(n) => Ok(LoxValue::Number(-n)),
                _ => Err(RuntimeError::new(operator, "Operand must be a number")),
            },
            TokenDiscriminant::Bang => Ok(LoxValue::Boolean(!value.is_truthy())),
            _ => Err(RuntimeError::new(
                operator,
                "`!` and `-` are the only valid unary operators",
            )),
        }
    }
}

fn num_op<F>(left: LoxValue, right: LoxValue, operator: Token, operation: F) -> Result<LoxValue, RuntimeError>
where
    F: Fn(f64, f64) -> LoxValue,
{
    match (left, right) {
        (LoxValue::Number(l), LoxValue::Number(r)) => Ok(operation(l, r)),
        (_, _) => Err(RuntimeError::operands_must_be_numbers(operator)),
    }
}

/// `< <= > >=`: numbers compare numerically, strings lexicographically,
/// booleans with `false < true`. Any other pairing (including cross-type) is
/// a runtime error.
fn compare(
    left: LoxValue,
    right: LoxValue,
    operator: Token,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<LoxValue, RuntimeError> {
    let ordering = match (&left, &right) {
        (LoxValue::Number(l), LoxValue::Number(r)) => {
            l.partial_cmp(r).ok_or_else(|| RuntimeError::operands_must_be_numbers(operator.clone()))?
        }
        (LoxValue::String(l), LoxValue::String(r)) => l.cmp(r),
        (LoxValue::Boolean(l), LoxValue::Boolean(r)) => l.cmp(r),
        (_, _) => {
            return Err(RuntimeError::new(
                operator,
                "comparison operands must both be numbers, both be strings, or both be booleans",
            ))
        }
    };
    Ok(LoxValue::Boolean(accept(ordering)))
}

#[derive(Debug, thiserror::Error)]
pub enum ExecuteRawError {
    #[error("Failed to parse the source code")]
    ParserError(Vec<crate::parser::ParseError>),
    #[error("Failed to resolve the source code")]
    ResolveError(Vec<crate::resolver::ResolveError>),
    #[error(transparent)]
    RuntimeError(RuntimeError),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", self.render())]
pub struct RuntimeError {
    t: Option<Token>,
    msg: String,
}

impl RuntimeError {
    fn render(&self) -> String {
        match &self.t {
            Some(t) => format!("{}\n[line {}]", self.msg, t.line()),
            None => self.msg.clone(),
        }
    }

    pub fn new(t: Token, msg: impl Into<String>) -> Self {
        Self {
            t: Some(t),
            msg: msg.into(),
        }
    }

    fn detached(msg: impl Into<String>) -> Self {
        Self {
            t: None,
            msg: msg.into(),
        }
    }

    pub fn operands_must_be_numbers(operator: Token) -> Self {
        Self::new(operator, "Operands must be numbers")
    }

    pub fn division_by_zero(operator: Token) -> Self {
        Self::new(operator, "Division by zero")
    }

    pub fn undefined_variable(identifier: Token, variable_name: &str) -> Self {
        Self::new(identifier, format!("Undefined variable '{variable_name}'."))
    }

    pub fn unbound_variable() -> Self {
        Self::detached("Reference to a binding that was never bound. This is an interpreter bug.")
    }

    pub fn read_before_initialization() -> Self {
        Self::detached("Cannot read a variable before it has been assigned a value")
    }

    pub fn failed_to_print(e: std::io::Error) -> Self {
        Self::detached(format!("Failed to execute a print statement.\n{e}"))
    }

    pub fn failed_to_flush(e: std::io::Error) -> Self {
        Self::detached(format!("Failed to flush the output stream.\n{e}"))
    }

    pub fn arity_mismatch(expected: u8, found: u8) -> Self {
        Self::detached(format!(
            "Expect {expected} arguments, but got {found} arguments."
        ))
    }

    fn not_callable(type_name: &str) -> Self {
        Self::detached(format!("A value of type `{type_name}` is not callable."))
    }

    fn not_an_instance(type_name: &str) -> Self {
        Self::detached(format!("Only instances have properties, found `{type_name}`."))
    }

    fn undefined_property(name: &str) -> Self {
        Self::detached(format!("Undefined property '{name}'."))
    }

    fn superclass_not_a_class(type_name: &str) -> Self {
        Self::detached(format!("Superclass must be a class, found `{type_name}`."))
    }

    fn not_a_trait(type_name: &str) -> Self {
        Self::detached(format!("`use` target must be a trait, found `{type_name}`."))
    }

    fn duplicate_trait_method(owner: &str, method_name: &str) -> Self {
        Self::detached(format!(
            "`{owner}` uses two traits that both define a method named '{method_name}'."
        ))
    }

    fn unexpected_return() -> Self {
        Self::detached("`return` was used in an illegal position")
    }

    fn break_or_continue_outside_loop() -> Self {
        Self::detached("`break`/`continue` was used outside of a loop")
    }

    pub(super) fn native_call_failed(name: &str, msg: impl std::fmt::Display) -> Self {
        Self::detached(format!("native function `{name}` failed: {msg}"))
    }
}
