use super::resolved_ast as r_ast;
use crate::parser::ast;
use crate::parser::ast::{Expression, FunctionKind, Statement};
use crate::resolver::environment::{Environment, GetResult, Lookup};
use crate::resolver::{BindingId, ResolveError};
use crate::scanner::Token;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionContext {
    Function,
    Method,
    ClassMethod,
    Getter,
    Initializer,
    Lambda,
}

#[derive(Clone, Copy)]
struct ClassContext {
    has_superclass: bool,
}

/// Tracks, for one active function/method/lambda resolution, which scope
/// index its own parameter scope starts at — any name resolved to a scope
/// below that index is a free variable the closure must capture.
struct CaptureFrame {
    start_scope_index: usize,
    captured: Vec<BindingId>,
}

pub struct Resolver {
    environment: Environment,
    errors: Vec<ResolveError>,
    capture_stack: Vec<CaptureFrame>,
    function_context_stack: Vec<FunctionContext>,
    class_context_stack: Vec<ClassContext>,
    loop_depth: u32,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
            errors: vec![],
            capture_stack: vec![],
            function_context_stack: vec![],
            class_context_stack: vec![],
            loop_depth: 0,
        }
    }

    pub fn resolve(&mut self, statements: Vec<Statement>) -> Vec<r_ast::Statement> {
        statements
            .into_iter()
            .map(|s| self.resolve_statement(s))
            .collect()
    }

    /// Drains the errors accumulated by the `resolve` call(s) made since the
    /// last time this was called. Takes `&mut self` (not `self`) so a single
    /// `Resolver` can keep living across a REPL session -- its binding-id
    /// counter and declared globals need to persist between lines.
    pub fn finish(&mut self) -> Result<(), Vec<ResolveError>> {
        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn error(&mut self, line: u64, message: impl Into<String>) {
        self.errors.push(ResolveError::new(line, message));
    }

    fn in_function(&self) -> bool {
        !self.function_context_stack.is_empty()
    }

    fn declare(&mut self, token: &Token, exempt_from_unused_check: bool) -> BindingId {
        let (id, err) = self.environment.declare(
            &token.lexeme(),
            token.line(),
            self.in_function(),
            exempt_from_unused_check,
        );
        if let Some(message) = err {
            self.error(token.line(), message);
        }
        id
    }

    fn define(&mut self, token: &Token) {
        self.environment.define(&token.lexeme());
    }

    fn note_capture(&mut self, lookup: &Lookup) {
        if let Some(frame) = self.capture_stack.last_mut() {
            let outside = match lookup {
                Lookup::Global(_) => true,
                Lookup::Local { scope_index, .. } => *scope_index < frame.start_scope_index,
            };
            if outside {
                let id = lookup.binding_id();
                if !frame.captured.contains(&id) {
                    frame.captured.push(id);
                }
            }
        }
    }

    /// Resolves a read of `token`'s lexeme: local scopes, then global, then
    /// (on a genuine miss) an implicit global declaration.
    fn resolve_read(&mut self, token: &Token) -> BindingId {
        self.resolve_read_name(&token.lexeme(), token.line())
    }

    fn resolve_read_name(&mut self, name: &str, line: u64) -> BindingId {
        match self.environment.get(name) {
            GetResult::Found(lookup) => {
                self.note_capture(&lookup);
                lookup.binding_id()
            }
            GetResult::UninitializedSelfReference => {
                self.error(
                    line,
                    format!("Can't read local variable '{name}' in its own initializer."),
                );
                self.environment.declare_implicit_global(name)
            }
            GetResult::Miss => self.environment.declare_implicit_global(name),
        }
    }

    /// Unlike a read, an assignment miss is never a legitimate forward
    /// reference -- there's no scenario where assigning to a name declares
    /// it. Report it and return a placeholder id so resolution can still
    /// produce a well-formed tree (the error aborts before the interpreter
    /// ever sees it).
    fn resolve_assign(&mut self, token: &Token) -> BindingId {
        match self.environment.assign(&token.lexeme()) {
            Some(lookup) => {
                self.note_capture(&lookup);
                lookup.binding_id()
            }
            None => {
                self.error(
                    token.line(),
                    format!("Undefined variable '{}'.", token.lexeme()),
                );
                self.environment.declare_implicit_global(&token.lexeme())
            }
        }
    }

    fn enter_scope_and_sweep_later(&mut self) -> crate::resolver::environment::ScopeGuard {
        self.environment.enter_scope()
    }

    fn exit_scope_and_sweep(&mut self, guard: crate::resolver::environment::ScopeGuard) {
        for (name, line) in self.environment.exit_scope(guard) {
            self.error(line, format!("Variable '{name}' is never used."));
        }
    }

    fn resolve_statement(&mut self, statement: Statement) -> r_ast::Statement {
        match statement {
            Statement::Expression(e) => {
                r_ast::Statement::Expression(r_ast::ExpressionStatement(self.resolve_expression(e.0)))
            }
            Statement::Print(p) => {
                r_ast::Statement::Print(r_ast::PrintStatement(self.resolve_expression(p.0)))
            }
            Statement::VariableDeclaration(v) => {
                let binding_id = self.declare(&v.identifier, false);
                let initializer = v.initializer.map(|init| self.resolve_expression(init));
                self.define(&v.identifier);
                r_ast::Statement::VariableDeclaration(r_ast::VariableDeclarationStatement {
                    initializer,
                    binding_id,
                })
            }
            Statement::Block(b) => {
                let guard = self.enter_scope_and_sweep_later();
                let statements = self.resolve(b.0);
                self.exit_scope_and_sweep(guard);
                r_ast::Statement::Block(r_ast::BlockStatement(statements))
            }
            Statement::IfElse(ifelse) => {
                let condition = self.resolve_expression(ifelse.condition);
                let if_branch = Box::new(self.resolve_statement(*ifelse.if_branch));
                let else_branch = ifelse
                    .else_branch
                    .map(|b| Box::new(self.resolve_statement(*b)));
                r_ast::Statement::IfElse(r_ast::IfElseStatement {
                    condition,
                    if_branch,
                    else_branch,
                })
            }
            Statement::While(w) => {
                let condition = self.resolve_expression(w.condition);
                self.loop_depth += 1;
                let body = Box::new(self.resolve_statement(*w.body));
                self.loop_depth -= 1;
                r_ast::Statement::While(r_ast::WhileStatement { condition, body })
            }
            Statement::For(f) => {
                // The whole loop head lives in its own scope so a `var` in
                // the initializer doesn't leak past the loop.
                let guard = self.enter_scope_and_sweep_later();
                let initializer = f
                    .initializer
                    .map(|s| Box::new(self.resolve_statement(*s)));
                let condition = f.condition.map(|c| self.resolve_expression(c));
                let increment = f.increment.map(|c| self.resolve_expression(c));
                self.loop_depth += 1;
                let body = Box::new(self.resolve_statement(*f.body));
                self.loop_depth -= 1;
                self.exit_scope_and_sweep(guard);
                r_ast::Statement::For(r_ast::ForStatement {
                    initializer,
                    condition,
                    increment,
                    body,
                })
            }
            Statement::Break(t) => {
                if self.loop_depth == 0 {
                    self.error(t.line(), "Can't use 'break' outside of a loop.");
                }
                r_ast::Statement::Break(t)
            }
            Statement::Continue(t) => {
                if self.loop_depth == 0 {
                    self.error(t.line(), "Can't use 'continue' outside of a loop.");
                }
                r_ast::Statement::Continue(t)
            }
            Statement::FunctionDeclaration(f) => {
                let name = f.name.lexeme();
                let name_binding_id = self.declare(&f.name, false);
                self.define(&f.name);
                let resolved = self.resolve_function_like(
                    f.parameters,
                    f.body,
                    FunctionContext::Function,
                    false,
                    false,
                );
                r_ast::Statement::FunctionDeclaration(r_ast::FunctionDeclarationStatement {
                    name,
                    name_binding_id: Some(name_binding_id),
                    parameters_binding_ids: resolved.0,
                    body: resolved.3,
                    kind: FunctionKind::Function,
                    captured_binding_ids: resolved.4,
                    this_binding_id: resolved.1,
                    super_binding_id: resolved.2,
                })
            }
            Statement::Return(r) => {
                if self.function_context_stack.is_empty() {
                    self.error(r.keyword.line(), "Can't return from top-level code.");
                }
                if matches!(
                    self.function_context_stack.last(),
                    Some(FunctionContext::Initializer)
                ) && r.value.is_some()
                {
                    self.error(r.keyword.line(), "Can't return a value from an initializer.");
                }
                let value = r.value.map(|v| self.resolve_expression(v));
                r_ast::Statement::Return(r_ast::ReturnStatement {
                    keyword: r.keyword,
                    value,
                })
            }
            Statement::Class(c) => r_ast::Statement::Class(self.resolve_class(c)),
            Statement::Trait(t) => r_ast::Statement::Trait(self.resolve_trait(t)),
        }
    }

    fn resolve_class(&mut self, c: ast::ClassStatement) -> r_ast::ClassStatement {
        let name_binding_id = self.declare(&c.name, false);
        self.define(&c.name);

        let superclass = c.superclass.map(|sc| {
            if sc.identifier.lexeme() == c.name.lexeme() {
                self.error(sc.identifier.line(), "A class can't inherit from itself.");
            }
            r_ast::VariableReferenceExpression {
                binding_id: self.resolve_read(&sc.identifier),
                identifier: sc.identifier,
            }
        });
        let has_superclass = superclass.is_some();

        self.class_context_stack.push(ClassContext { has_superclass });
        let uses = c
            .uses
            .into_iter()
            .map(|t| r_ast::VariableReferenceExpression {
                binding_id: self.resolve_read(&t),
                identifier: t,
            })
            .collect();
        let methods = c
            .methods
            .into_iter()
            .map(|m| self.resolve_method(m, has_superclass))
            .collect();
        self.class_context_stack.pop();

        r_ast::ClassStatement {
            name_binding_id,
            name: c.name,
            superclass,
            uses,
            methods,
        }
    }

    fn resolve_trait(&mut self, t: ast::TraitStatement) -> r_ast::TraitStatement {
        let name = t.name.lexeme();
        let name_binding_id = self.declare(&t.name, false);
        self.define(&t.name);

        self.class_context_stack.push(ClassContext { has_superclass: false });
        let uses = t
            .uses
            .into_iter()
            .map(|tok| r_ast::VariableReferenceExpression {
                binding_id: self.resolve_read(&tok),
                identifier: tok,
            })
            .collect();
        let methods = t
            .methods
            .into_iter()
            .map(|m| self.resolve_method(m, false))
            .collect();
        self.class_context_stack.pop();

        r_ast::TraitStatement {
            name,
            name_binding_id,
            uses,
            methods,
        }
    }

    fn resolve_method(
        &mut self,
        m: ast::FunctionDeclarationStatement,
        has_superclass: bool,
    ) -> r_ast::FunctionDeclarationStatement {
        let (context, bind_super) = match m.kind {
            FunctionKind::ClassMethod => (FunctionContext::ClassMethod, false),
            FunctionKind::Getter => (FunctionContext::Getter, has_superclass),
            FunctionKind::Initializer => (FunctionContext::Initializer, has_superclass),
            FunctionKind::Method => (FunctionContext::Method, has_superclass),
            FunctionKind::Function => unreachable!("class/trait bodies only contain methods"),
        };
        let name = m.name.lexeme();
        let (parameters_binding_ids, this_binding_id, super_binding_id, body, captured) =
            self.resolve_function_like(m.parameters, m.body, context, true, bind_super);
        r_ast::FunctionDeclarationStatement {
            name,
            name_binding_id: None,
            parameters_binding_ids,
            body,
            kind: m.kind,
            captured_binding_ids: captured,
            this_binding_id,
            super_binding_id,
        }
    }

    #[allow(clippy::type_complexity)]
    fn resolve_function_like(
        &mut self,
        parameters: Vec<Token>,
        body: Vec<Statement>,
        context: FunctionContext,
        bind_this: bool,
        bind_super: bool,
    ) -> (
        Vec<BindingId>,
        Option<BindingId>,
        Option<BindingId>,
        Vec<r_ast::Statement>,
        Vec<BindingId>,
    ) {
        let guard = self.environment.enter_scope();
        self.capture_stack.push(CaptureFrame {
            start_scope_index: guard.1,
            captured: vec![],
        });
        self.function_context_stack.push(context);
        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);

        let this_binding_id = if bind_this {
            let (id, _) = self.environment.declare("this", 0, true, true);
            self.environment.define("this");
            Some(id)
        } else {
            None
        };
        let super_binding_id = if bind_super {
            let (id, _) = self.environment.declare("super", 0, true, true);
            self.environment.define("super");
            Some(id)
        } else {
            None
        };

        let parameters_binding_ids = parameters
            .iter()
            .map(|p| {
                let id = self.declare(p, true);
                self.define(p);
                id
            })
            .collect();

        let body = self.resolve(body);

        self.loop_depth = saved_loop_depth;
        self.function_context_stack.pop();
        let capture_frame = self.capture_stack.pop().expect("capture stack underflow");
        self.exit_scope_and_sweep(guard);

        (
            parameters_binding_ids,
            this_binding_id,
            super_binding_id,
            body,
            capture_frame.captured,
        )
    }

    fn resolve_expression(&mut self, expr: Expression) -> r_ast::Expression {
        match expr {
            Expression::Binary(b) => {
                let left = Box::new(self.resolve_expression(*b.left));
                let right = Box::new(self.resolve_expression(*b.right));
                r_ast::Expression::Binary(r_ast::BinaryExpression {
                    left,
                    operator: b.operator,
                    right,
                })
            }
            Expression::Logical(b) => {
                let left = Box::new(self.resolve_expression(*b.left));
                let right = Box::new(self.resolve_expression(*b.right));
                r_ast::Expression::Logical(r_ast::LogicalExpression {
                    left,
                    operator: b.operator,
                    right,
                })
            }
            Expression::Unary(u) => {
                let operand = Box::new(self.resolve_expression(*u.operand));
                r_ast::Expression::Unary(r_ast::UnaryExpression {
                    operand,
                    operator: u.operator,
                })
            }
            Expression::Ternary(t) => {
                let condition = Box::new(self.resolve_expression(*t.condition));
                let then_branch = Box::new(self.resolve_expression(*t.then_branch));
                let else_branch = Box::new(self.resolve_expression(*t.else_branch));
                r_ast::Expression::Ternary(r_ast::TernaryExpression {
                    condition,
                    then_branch,
                    else_branch,
                })
            }
            Expression::Literal(l) => {
                let l = match l {
                    ast::LiteralExpression::Boolean(t) => {
                        r_ast::LiteralExpression::Boolean(t.discriminant() == crate::scanner::TokenDiscriminant::True)
                    }
                    ast::LiteralExpression::Null(_) => r_ast::LiteralExpression::Null,
                    ast::LiteralExpression::String(t) => {
                        r_ast::LiteralExpression::String(t.ty().string().unwrap())
                    }
                    ast::LiteralExpression::Number(t) => {
                        r_ast::LiteralExpression::Number(t.ty().number().unwrap())
                    }
                };
                r_ast::Expression::Literal(l)
            }
            Expression::Grouping(g) => {
                r_ast::Expression::Grouping(r_ast::GroupingExpression(Box::new(self.resolve_expression(*g.0))))
            }
            Expression::VariableReference(v) => r_ast::Expression::VariableReference(
                r_ast::VariableReferenceExpression {
                    binding_id: self.resolve_read(&v.identifier),
                    identifier: v.identifier,
                },
            ),
            Expression::VariableAssignment(a) => {
                let value = Box::new(self.resolve_expression(*a.value));
                r_ast::Expression::VariableAssignment(r_ast::VariableAssignmentExpression {
                    binding_id: self.resolve_assign(&a.identifier),
                    identifier: a.identifier,
                    value,
                })
            }
            Expression::Call(c) => {
                let callee = Box::new(self.resolve_expression(*c.callee));
                let arguments = c.arguments.into_iter().map(|a| self.resolve_expression(a)).collect();
                r_ast::Expression::Call(r_ast::CallExpression {
                    callee,
                    paren: c.paren,
                    arguments,
                })
            }
            Expression::Get(g) => {
                let object = Box::new(self.resolve_expression(*g.object));
                r_ast::Expression::Get(r_ast::GetExpression { object, name: g.name })
            }
            Expression::Set(s) => {
                let object = Box::new(self.resolve_expression(*s.object));
                let value = Box::new(self.resolve_expression(*s.value));
                r_ast::Expression::Set(r_ast::SetExpression {
                    object,
                    name: s.name,
                    value,
                })
            }
            Expression::This(t) => {
                if self.class_context_stack.is_empty() {
                    self.error(t.keyword.line(), "Can't use 'this' outside of a class.");
                }
                r_ast::Expression::This(r_ast::ThisExpression {
                    binding_id: self.resolve_read_name("this", t.keyword.line()),
                })
            }
            Expression::Super(s) => {
                match self.class_context_stack.last() {
                    None => self.error(s.keyword.line(), "Can't use 'super' outside of a class."),
                    Some(ctx) if !ctx.has_superclass => {
                        self.error(s.keyword.line(), "Can't use 'super' in a class with no superclass.")
                    }
                    _ => {}
                }
                r_ast::Expression::Super(r_ast::SuperExpression {
                    binding_id: self.resolve_read_name("super", s.keyword.line()),
                    this_binding_id: self.resolve_read_name("this", s.keyword.line()),
                    method: s.method,
                })
            }
            Expression::Lambda(l) => {
                let (parameters_binding_ids, _, _, body, captured) =
                    self.resolve_function_like(l.parameters, l.body, FunctionContext::Lambda, false, false);
                r_ast::Expression::Lambda(r_ast::LambdaExpression {
                    parameters_binding_ids,
                    body,
                    captured_binding_ids: captured,
                })
            }
        }
    }
}
