pub mod ast;

use crate::parser::ast::{
    BlockStatement, ClassStatement, ExpressionStatement, ForStatement, FunctionDeclarationStatement,
    FunctionKind, IfElseStatement, LambdaExpression, PrintStatement, ReturnStatement,
    SuperExpression, ThisExpression, TraitStatement, VariableDeclarationStatement, WhileStatement,
};
use crate::scanner::{Token, TokenDiscriminant, TokenType};
use ast::{Expression, LiteralExpression, Statement};
use itertools::{Itertools, MultiPeek};
use std::fmt::Write;
use thiserror::Error;

#[derive(PartialEq, Eq, Copy, Clone)]
enum ParsingMode {
    ErrorRecovery,
    Normal,
}

/// A syntax error discovered while parsing, formatted textbook-style as
/// `[line N] Error at '<lexeme>': <message>`.
#[derive(Debug, Error, Clone)]
#[error("[line {line}] Error {where_}: {message}")]
pub struct ParseError {
    pub line: u64,
    where_: String,
    message: String,
}

impl ParseError {
    fn new(token: &Token, message: impl Into<String>) -> Self {
        let where_ = if token.discriminant() == TokenDiscriminant::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme())
        };
        Self {
            line: token.line(),
            where_,
            message: message.into(),
        }
    }
}

pub struct Parser<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    tokens: MultiPeek<Source<TokenIter>>,
    mode: ParsingMode,
    errors: Vec<ParseError>,
}

impl<TokenIter> Parser<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    pub fn parse(tokens: TokenIter) -> Result<Vec<Statement>, Vec<ParseError>> {
        let mut parser = Self {
            tokens: Source(tokens).multipeek(),
            mode: ParsingMode::Normal,
            errors: vec![],
        };

        let mut statements = vec![];
        while !parser.is_at_end() {
            match parser.declaration() {
                Some(statement) => statements.push(statement),
                None => parser.advance_until_recovery_point(),
            }
        }
        if parser.errors.is_empty() {
            Ok(statements)
        } else {
            Err(parser.errors)
        }
    }

    fn declaration(&mut self) -> Option<Statement> {
        if self.check(TokenDiscriminant::Class) {
            self.advance();
            self.class_declaration().map(Statement::Class)
        } else if self.check(TokenDiscriminant::Trait) {
            self.advance();
            self.trait_declaration().map(Statement::Trait)
        } else if self.check(TokenDiscriminant::Fun) && self.peek2_is(TokenDiscriminant::Identifier)
        {
            self.advance();
            self.function(FunctionKind::Function)
                .map(Statement::FunctionDeclaration)
        } else if self.advance_on_match(&[TokenDiscriminant::Var]).is_some() {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Option<Statement> {
        let identifier = self.expect(TokenDiscriminant::Identifier, "Expect variable name.")?;
        let mut initializer = None;
        if self.advance_on_match(&[TokenDiscriminant::Equal]).is_some() {
            initializer = Some(self.expression()?);
        }
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after variable declaration.")?;
        Some(Statement::VariableDeclaration(VariableDeclarationStatement {
            initializer,
            identifier,
        }))
    }

    fn class_declaration(&mut self) -> Option<ClassStatement> {
        let name = self.expect(TokenDiscriminant::Identifier, "Expect class name.")?;
        let superclass = if self.advance_on_match(&[TokenDiscriminant::Less]).is_some() {
            let superclass_name =
                self.expect(TokenDiscriminant::Identifier, "Expect superclass name.")?;
            Some(ast::VariableReferenceExpression {
                identifier: superclass_name,
            })
        } else {
            None
        };
        self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before class body.")?;
        let (uses, methods) = self.class_body()?;
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after class body.")?;
        Some(ClassStatement {
            name,
            superclass,
            uses,
            methods,
        })
    }

    fn trait_declaration(&mut self) -> Option<TraitStatement> {
        let name = self.expect(TokenDiscriminant::Identifier, "Expect trait name.")?;
        self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before trait body.")?;
        let (uses, methods) = self.class_body()?;
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after trait body.")?;
        Some(TraitStatement {
            name,
            uses,
            methods,
        })
    }

    /// Shared by `class` and `trait` bodies: a mix of `use Trait, ...;`
    /// statements and method/getter definitions.
    fn class_body(&mut self) -> Option<(Vec<Token>, Vec<FunctionDeclarationStatement>)> {
        let mut uses = vec![];
        let mut methods = vec![];
        while !self.check(TokenDiscriminant::RightBrace) && !self.is_at_end() {
            if self.advance_on_match(&[TokenDiscriminant::Use]).is_some() {
                loop {
                    uses.push(self.expect(TokenDiscriminant::Identifier, "Expect trait name.")?);
                    if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                        break;
                    }
                }
                self.expect(TokenDiscriminant::Semicolon, "Expect ';' after trait use.")?;
            } else {
                methods.push(self.method()?);
            }
        }
        Some((uses, methods))
    }

    fn method(&mut self) -> Option<FunctionDeclarationStatement> {
        let is_class_method = self.advance_on_match(&[TokenDiscriminant::Class]).is_some();
        let name = self.expect(TokenDiscriminant::Identifier, "Expect method name.")?;

        if self.check(TokenDiscriminant::LeftParen) {
            let kind = if is_class_method {
                FunctionKind::ClassMethod
            } else if name.lexeme() == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.function_tail(name, kind)
        } else {
            // Getter: no parameter list at all.
            self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before getter body.")?;
            let body = self.block()?;
            Some(FunctionDeclarationStatement {
                name,
                parameters: vec![],
                body,
                kind: FunctionKind::Getter,
            })
        }
    }

    fn function(&mut self, kind: FunctionKind) -> Option<FunctionDeclarationStatement> {
        let name = self.expect(TokenDiscriminant::Identifier, "Expect function name.")?;
        self.function_tail(name, kind)
    }

    fn function_tail(
        &mut self,
        name: Token,
        kind: FunctionKind,
    ) -> Option<FunctionDeclarationStatement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after name.")?;
        let parameters = self.parameters()?;
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after parameters.")?;
        self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before body.")?;
        let body = self.block()?;
        Some(FunctionDeclarationStatement {
            name,
            parameters,
            body,
            kind,
        })
    }

    fn parameters(&mut self) -> Option<Vec<Token>> {
        let mut parameters = vec![];
        if !self.check(TokenDiscriminant::RightParen) {
            loop {
                if parameters.len() >= 255 {
                    if let Some(t) = self.peek() {
                        self.error(&t, "Can't have more than 255 parameters.");
                    }
                }
                parameters.push(self.expect(TokenDiscriminant::Identifier, "Expect parameter name.")?);
                if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                    break;
                }
            }
        }
        Some(parameters)
    }

    fn statement(&mut self) -> Option<Statement> {
        if self.advance_on_match(&[TokenDiscriminant::Print]).is_some() {
            self.print_statement().map(Statement::Print)
        } else if self.advance_on_match(&[TokenDiscriminant::While]).is_some() {
            self.while_statement().map(Statement::While)
        } else if self.advance_on_match(&[TokenDiscriminant::For]).is_some() {
            self.for_statement()
        } else if self.advance_on_match(&[TokenDiscriminant::If]).is_some() {
            self.if_else_statement().map(Statement::IfElse)
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Return]) {
            self.return_statement(keyword).map(Statement::Return)
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Break]) {
            self.expect(TokenDiscriminant::Semicolon, "Expect ';' after 'break'.")?;
            Some(Statement::Break(t))
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Continue]) {
            self.expect(TokenDiscriminant::Semicolon, "Expect ';' after 'continue'.")?;
            Some(Statement::Continue(t))
        } else if self.advance_on_match(&[TokenDiscriminant::LeftBrace]).is_some() {
            self.block().map(BlockStatement).map(Statement::Block)
        } else {
            self.expression_statement().map(Statement::Expression)
        }
    }

    fn return_statement(&mut self, keyword: Token) -> Option<ReturnStatement> {
        let value = if self.check(TokenDiscriminant::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after return value.")?;
        Some(ReturnStatement { keyword, value })
    }

    /// Kept as a genuine three-clause statement: desugaring into a `while`
    /// would make `continue` skip the increment instead of re-running it.
    fn for_statement(&mut self) -> Option<Statement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.advance_on_match(&[TokenDiscriminant::Semicolon]).is_some() {
            None
        } else if self.advance_on_match(&[TokenDiscriminant::Var]).is_some() {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(Statement::Expression(self.expression_statement()?)))
        };

        let condition = if self.check(TokenDiscriminant::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenDiscriminant::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after for clauses.")?;

        let body = Box::new(self.statement()?);

        Some(Statement::For(ForStatement {
            initializer,
            condition,
            increment,
            body,
        }))
    }

    fn block(&mut self) -> Option<Vec<Statement>> {
        let mut statements = vec![];
        while !self.check(TokenDiscriminant::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after block.")?;
        Some(statements)
    }

    fn while_statement(&mut self) -> Option<WhileStatement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Some(WhileStatement {
            condition,
            body: Box::new(body),
        })
    }

    fn if_else_statement(&mut self) -> Option<IfElseStatement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after condition.")?;
        let if_branch = self.statement()?;
        let mut else_branch = None;
        if self.advance_on_match(&[TokenDiscriminant::Else]).is_some() {
            else_branch = Some(Box::new(self.statement()?));
        }
        Some(IfElseStatement {
            condition,
            if_branch: Box::new(if_branch),
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Option<PrintStatement> {
        let expr = self.expression()?;
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after value.")?;
        Some(PrintStatement(expr))
    }

    fn expression_statement(&mut self) -> Option<ExpressionStatement> {
        let expr = self.expression()?;
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after expression.")?;
        Some(ExpressionStatement(expr))
    }

    fn expression(&mut self) -> Option<Expression> {
        self.assignment()
    }

    fn assignment(&mut self) -> Option<Expression> {
        let expr = self.ternary()?;

        if let Some(equals) = self.advance_on_match(&[TokenDiscriminant::Equal]) {
            let value = self.assignment()?;
            return match expr {
                Expression::VariableReference(v) => {
                    Some(Expression::variable_assignment(v.identifier, value))
                }
                Expression::Get(g) => Some(Expression::set(*g.object, g.name, value)),
                _ => {
                    self.error(&equals, "Invalid assignment target.");
                    None
                }
            };
        }
        Some(expr)
    }

    fn ternary(&mut self) -> Option<Expression> {
        let condition = self.comma()?;
        if self.advance_on_match(&[TokenDiscriminant::Question]).is_some() {
            let then_branch = self.ternary()?;
            self.expect(TokenDiscriminant::Colon, "Expect ':' in ternary expression.")?;
            let else_branch = self.ternary()?;
            return Some(Expression::ternary(condition, then_branch, else_branch));
        }
        Some(condition)
    }

    fn comma(&mut self) -> Option<Expression> {
        let mut expr = self.or()?;
        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::Comma]) {
            let right = self.or()?;
            expr = Expression::binary(expr, operator, right);
        }
        Some(expr)
    }

    fn or(&mut self) -> Option<Expression> {
        let mut expr = self.and()?;
        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::Or]) {
            let right = self.and()?;
            expr = Expression::logical(expr, operator, right);
        }
        Some(expr)
    }

    fn and(&mut self) -> Option<Expression> {
        let mut expr = self.equality()?;
        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::And]) {
            let right = self.equality()?;
            expr = Expression::logical(expr, operator, right);
        }
        Some(expr)
    }

    const EQUALITY_OPS: [TokenDiscriminant; 2] =
        [TokenDiscriminant::BangEqual, TokenDiscriminant::EqualEqual];
    const COMPARISON_OPS: [TokenDiscriminant; 4] = [
        TokenDiscriminant::Greater,
        TokenDiscriminant::GreaterEqual,
        TokenDiscriminant::Less,
        TokenDiscriminant::LessEqual,
    ];
    const TERM_OPS: [TokenDiscriminant; 2] = [TokenDiscriminant::Minus, TokenDiscriminant::Plus];
    const FACTOR_OPS: [TokenDiscriminant; 2] = [TokenDiscriminant::Slash, TokenDiscriminant::Star];

    fn equality(&mut self) -> Option<Expression> {
        if let Some(operator) = self.peek().filter(|t| Self::EQUALITY_OPS.contains(&t.discriminant())) {
            self.error(&operator, format!("Binary operator '{}' with no left-hand operand.", operator.lexeme()));
            self.advance();
            self.comparison()?;
            return None;
        }
        let mut expr = self.comparison()?;
        while let Some(operator) = self.advance_on_match(&Self::EQUALITY_OPS) {
            let right = self.comparison()?;
            expr = Expression::binary(expr, operator, right);
        }
        Some(expr)
    }

    fn comparison(&mut self) -> Option<Expression> {
        if let Some(operator) = self.peek().filter(|t| Self::COMPARISON_OPS.contains(&t.discriminant())) {
            self.error(&operator, format!("Binary operator '{}' with no left-hand operand.", operator.lexeme()));
            self.advance();
            self.term()?;
            return None;
        }
        let mut expr = self.term()?;
        while let Some(operator) = self.advance_on_match(&Self::COMPARISON_OPS) {
            let right = self.term()?;
            expr = Expression::binary(expr, operator, right);
        }
        Some(expr)
    }

    fn term(&mut self) -> Option<Expression> {
        if let Some(operator) = self.peek().filter(|t| t.discriminant() == TokenDiscriminant::Plus) {
            self.error(&operator, "Binary operator '+' with no left-hand operand.");
            self.advance();
            self.factor()?;
            return None;
        }
        let mut expr = self.factor()?;
        while let Some(operator) = self.advance_on_match(&Self::TERM_OPS) {
            let right = self.factor()?;
            expr = Expression::binary(expr, operator, right);
        }
        Some(expr)
    }

    fn factor(&mut self) -> Option<Expression> {
        if let Some(operator) = self.peek().filter(|t| Self::FACTOR_OPS.contains(&t.discriminant())) {
            self.error(&operator, format!("Binary operator '{}' with no left-hand operand.", operator.lexeme()));
            self.advance();
            self.unary()?;
            return None;
        }
        let mut expr = self.unary()?;
        while let Some(operator) = self.advance_on_match(&Self::FACTOR_OPS) {
            let right = self.unary()?;
            expr = Expression::binary(expr, operator, right);
        }
        Some(expr)
    }

    fn unary(&mut self) -> Option<Expression> {
        if let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Bang, TokenDiscriminant::Minus])
        {
            Some(Expression::unary(operator, self.unary()?))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Option<Expression> {
        let mut expr = self.primary()?;
        loop {
            if self.advance_on_match(&[TokenDiscriminant::LeftParen]).is_some() {
                expr = self.finish_call(expr)?;
            } else if self.advance_on_match(&[TokenDiscriminant::Dot]).is_some() {
                let name = self.expect(TokenDiscriminant::Identifier, "Expect property name after '.'.")?;
                expr = Expression::get(expr, name);
            } else {
                break;
            }
        }
        Some(expr)
    }

    fn finish_call(&mut self, callee: Expression) -> Option<Expression> {
        let mut arguments = vec![];
        if !self.check(TokenDiscriminant::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    if let Some(t) = self.peek() {
                        self.error(&t, "Can't have more than 255 arguments.");
                    }
                }
                arguments.push(self.or()?);
                if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                    break;
                }
            }
        }
        let closing_parenthesis =
            self.expect(TokenDiscriminant::RightParen, "Expect ')' after arguments.")?;
        Some(Expression::call(callee, closing_parenthesis, arguments))
    }

    fn primary(&mut self) -> Option<Expression> {
        if let Some(t) = self.advance_on_match(&[TokenDiscriminant::True]) {
            return Some(Expression::boolean(t));
        }
        if let Some(t) = self.advance_on_match(&[TokenDiscriminant::False]) {
            return Some(Expression::boolean(t));
        }
        if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Nil]) {
            return Some(Expression::null(t));
        }
        if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Number]) {
            return Some(Expression::number(t));
        }
        if let Some(t) = self.advance_on_match(&[TokenDiscriminant::String]) {
            return Some(Expression::string(t));
        }
        if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::This]) {
            return Some(Expression::This(ThisExpression { keyword }));
        }
        if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Super]) {
            self.expect(TokenDiscriminant::Dot, "Expect '.' after 'super'.")?;
            let method = self.expect(TokenDiscriminant::Identifier, "Expect superclass method name.")?;
            return Some(Expression::Super(SuperExpression { keyword, method }));
        }
        if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Identifier]) {
            return Some(Expression::variable_reference(t));
        }
        if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Fun]) {
            self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'fun'.")?;
            let parameters = self.parameters()?;
            self.expect(TokenDiscriminant::RightParen, "Expect ')' after lambda parameters.")?;
            self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before lambda body.")?;
            let body = self.block()?;
            return Some(Expression::Lambda(LambdaExpression {
                keyword,
                parameters,
                body,
            }));
        }
        if self.advance_on_match(&[TokenDiscriminant::LeftParen]).is_some() {
            let expr = self.expression()?;
            self.expect(TokenDiscriminant::RightParen, "Expect ')' after expression.")?;
            return Some(Expression::grouping(expr));
        }

        if let Some(t) = self.peek() {
            self.error(&t, "Expect expression.");
        }
        None
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(ParseError::new(token, message));
        self.mode = ParsingMode::ErrorRecovery;
    }

    fn check(&mut self, kind: TokenDiscriminant) -> bool {
        self.peek().map(|t| t.discriminant() == kind).unwrap_or(false)
    }

    fn peek2_is(&mut self, kind: TokenDiscriminant) -> bool {
        if self.mode != ParsingMode::Normal {
            return false;
        }
        self.tokens.peek();
        let result = self
            .tokens
            .peek()
            .map(|t| t.discriminant() == kind)
            .unwrap_or(false);
        self.tokens.reset_peek();
        result
    }

    fn advance_on_match(&mut self, token_types: &[TokenDiscriminant]) -> Option<Token> {
        let upcoming = self.peek()?;
        if token_types.contains(&upcoming.discriminant()) {
            self.advance()
        } else {
            None
        }
    }

    fn advance_until_recovery_point(&mut self) {
        loop {
            let current = match self.tokens.next() {
                Some(t) => t,
                None => break,
            };
            if current.discriminant() == TokenDiscriminant::Semicolon {
                break;
            }
            let at_boundary = self
                .tokens
                .peek()
                .map(|t| {
                    matches!(
                        t.discriminant(),
                        TokenDiscriminant::Class
                            | TokenDiscriminant::Fun
                            | TokenDiscriminant::Var
                            | TokenDiscriminant::For
                            | TokenDiscriminant::If
                            | TokenDiscriminant::While
                            | TokenDiscriminant::Print
                            | TokenDiscriminant::Return
                            | TokenDiscriminant::Break
                            | TokenDiscriminant::Continue
                            | TokenDiscriminant::Trait
                    )
                })
                .unwrap_or(false);
            self.tokens.reset_peek();
            if at_boundary {
                break;
            }
        }
        self.mode = ParsingMode::Normal;
    }

    fn expect(&mut self, token_type: TokenDiscriminant, message: &str) -> Option<Token> {
        if let Some(t) = self.advance_on_match(&[token_type]) {
            return Some(t);
        }
        if let Some(t) = self.peek() {
            self.error(&t, message);
        }
        None
    }

    fn advance(&mut self) -> Option<Token> {
        if self.mode == ParsingMode::Normal {
            self.tokens.next()
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<Token> {
        if self.mode == ParsingMode::Normal {
            let t = self.tokens.peek().cloned();
            self.tokens.reset_peek();
            t
        } else {
            None
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.peek()
            .map(|t| t.discriminant() == TokenDiscriminant::Eof)
            .unwrap_or(true)
    }
}

/// Our parser does not care about trivia tokens.
/// We give `Source` to our parser instead of the raw token stream: `Source` wraps the underlying
/// token stream and makes sure to skip all trivia tokens, making them invisible to the parser.
struct Source<TokenIter>(TokenIter)
where
    TokenIter: Iterator<Item = Token>;

impl<TokenIter> Iterator for Source<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.0.next() {
                None => break None,
                Some(t) if t.discriminant() == TokenDiscriminant::Trivia => continue,
                Some(t) => break Some(t),
            }
        }
    }
}

#[allow(unused)]
pub fn display_ast(s: &Statement) -> Result<String, std::fmt::Error> {
    let mut buffer = String::new();
    _display_statement(&mut buffer, s, 0)?;
    Ok(buffer)
}

fn _display_statement(w: &mut impl Write, s: &Statement, depth: u8) -> Result<(), std::fmt::Error> {
    write!(w, "{}", " ".repeat(depth as usize))?;
    match s {
        Statement::Expression(ExpressionStatement(e)) => {
            writeln!(w, "Expression")?;
            _display_expression(w, e, depth + 1)?;
        }
        Statement::Print(PrintStatement(e)) => {
            writeln!(w, "Print")?;
            _display_expression(w, e, depth + 1)?;
        }
        Statement::VariableDeclaration(VariableDeclarationStatement {
            initializer,
            identifier,
        }) => {
            writeln!(w, "Variable Declaration")?;
            _display_token(w, identifier, depth + 1)?;
            if let Some(e) = initializer {
                _display_expression(w, e, depth + 1)?;
            }
        }
        Statement::Block(BlockStatement(statements)) => {
            writeln!(w, "Block")?;
            for statement in statements {
                _display_statement(w, statement, depth + 1)?;
            }
        }
        Statement::IfElse(IfElseStatement {
            condition,
            if_branch,
            else_branch,
        }) => {
            writeln!(w, "IfElse")?;
            _display_expression(w, condition, depth + 1)?;
            _display_statement(w, if_branch, depth + 1)?;
            if let Some(else_branch) = else_branch {
                _display_statement(w, else_branch, depth + 1)?;
            }
        }
        Statement::While(WhileStatement { condition, body }) => {
            writeln!(w, "While")?;
            _display_expression(w, condition, depth + 1)?;
            _display_statement(w, body, depth + 1)?;
        }
        Statement::For(ForStatement {
            initializer,
            condition,
            increment,
            body,
        }) => {
            writeln!(w, "For")?;
            if let Some(initializer) = initializer {
                _display_statement(w, initializer, depth + 1)?;
            }
            if let Some(condition) = condition {
                _display_expression(w, condition, depth + 1)?;
            }
            if let Some(increment) = increment {
                _display_expression(w, increment, depth + 1)?;
            }
            _display_statement(w, body, depth + 1)?;
        }
        Statement::Break(_) => writeln!(w, "Break")?,
        Statement::Continue(_) => writeln!(w, "Continue")?,
        Statement::FunctionDeclaration(FunctionDeclarationStatement { name, parameters, body, .. }) => {
            writeln!(w, "Function Declaration")?;
            _display_token(w, name, depth + 1)?;
            _display_string(w, "Parameters", depth + 1)?;
            for parameter in parameters {
                _display_token(w, parameter, depth + 2)?;
            }
            _display_string(w, "Body", depth + 1)?;
            for s in body {
                _display_statement(w, s, depth + 2)?;
            }
        }
        Statement::Return(ReturnStatement { value, .. }) => {
            writeln!(w, "Return")?;
            if let Some(value) = value {
                _display_expression(w, value, depth + 1)?;
            }
        }
        Statement::Class(ClassStatement { name, methods, .. }) => {
            writeln!(w, "Class")?;
            _display_token(w, name, depth + 1)?;
            for method in methods {
                _display_token(w, &method.name, depth + 1)?;
            }
        }
        Statement::Trait(TraitStatement { name, methods, .. }) => {
            writeln!(w, "Trait")?;
            _display_token(w, name, depth + 1)?;
            for method in methods {
                _display_token(w, &method.name, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn _display_expression(
    w: &mut impl Write,
    e: &Expression,
    depth: u8,
) -> Result<(), std::fmt::Error> {
    write!(w, "{}", " ".repeat(depth as usize))?;
    match e {
        Expression::Binary(b) => {
            writeln!(w, "Binary")?;
            _display_expression(w, &b.left, depth + 1)?;
            _display_token(w, &b.operator, depth + 1)?;
            _display_expression(w, &b.right, depth + 1)?;
        }
        Expression::Logical(b) => {
            writeln!(w, "Logical")?;
            _display_expression(w, &b.left, depth + 1)?;
            _display_token(w, &b.operator, depth + 1)?;
            _display_expression(w, &b.right, depth + 1)?;
        }
        Expression::Unary(u) => {
            writeln!(w, "Unary")?;
            _display_token(w, &u.operator, depth + 1)?;
            _display_expression(w, &u.operand, depth + 1)?;
        }
        Expression::Ternary(t) => {
            writeln!(w, "Ternary")?;
            _display_expression(w, &t.condition, depth + 1)?;
            _display_expression(w, &t.then_branch, depth + 1)?;
            _display_expression(w, &t.else_branch, depth + 1)?;
        }
        Expression::Literal(l) => {
            writeln!(w, "Literal")?;
            match l {
                LiteralExpression::Null(t)
                | LiteralExpression::String(t)
                | LiteralExpression::Number(t)
                | LiteralExpression::Boolean(t) => {
                    _display_token(w, t, depth + 1)?;
                }
            }
        }
        Expression::Grouping(g) => {
            writeln!(w, "Grouping")?;
            _display_expression(w, &g.0, depth + 1)?;
        }
        Expression::VariableReference(ast::VariableReferenceExpression { identifier }) => {
            writeln!(w, "Variable Reference")?;
            _display_token(w, identifier, depth + 1)?;
        }
        Expression::VariableAssignment(ast::VariableAssignmentExpression { identifier, value }) => {
            writeln!(w, "Variable Assignment")?;
            _display_token(w, identifier, depth + 1)?;
            _display_expression(w, value, depth + 1)?;
        }
        Expression::Call(ast::CallExpression {
            callee, arguments, ..
        }) => {
            writeln!(w, "Call")?;
            _display_expression(w, callee, depth + 1)?;
            _display_string(w, "Arguments", depth + 1)?;
            for argument in arguments {
                _display_expression(w, argument, depth + 2)?;
            }
        }
        Expression::Get(ast::GetExpression { object, name }) => {
            writeln!(w, "Get")?;
            _display_expression(w, object, depth + 1)?;
            _display_token(w, name, depth + 1)?;
        }
        Expression::Set(ast::SetExpression { object, name, value }) => {
            writeln!(w, "Set")?;
            _display_expression(w, object, depth + 1)?;
            _display_token(w, name, depth + 1)?;
            _display_expression(w, value, depth + 1)?;
        }
        Expression::This(_) => {
            writeln!(w, "This")?;
        }
        Expression::Super(SuperExpression { method, .. }) => {
            writeln!(w, "Super")?;
            _display_token(w, method, depth + 1)?;
        }
        Expression::Lambda(LambdaExpression { parameters, body, .. }) => {
            writeln!(w, "Lambda")?;
            _display_string(w, "Parameters", depth + 1)?;
            for parameter in parameters {
                _display_token(w, parameter, depth + 2)?;
            }
            _display_string(w, "Body", depth + 1)?;
            for s in body {
                _display_statement(w, s, depth + 2)?;
            }
        }
    }
    Ok(())
}

fn _display_token(w: &mut impl Write, t: &Token, depth: u8) -> std::fmt::Result {
    write!(w, "{}", " ".repeat(depth as usize))?;
    write!(w, "{:?}", t.discriminant())?;
    match t.ty() {
        TokenType::String(s) => writeln!(w, " \"{}\"", s)?,
        TokenType::Number(n) => writeln!(w, " {}", n)?,
        _ => writeln!(w)?,
    }
    Ok(())
}

fn _display_string(w: &mut impl Write, s: &str, depth: u8) -> std::fmt::Result {
    write!(w, "{}", " ".repeat(depth as usize))?;
    writeln!(w, "{}", s)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::parser::{display_ast, Parser};
    use crate::scanner::Scanner;
    use insta::assert_display_snapshot;

    fn parse(source: &str) -> String {
        if let Ok(statements) = Parser::parse(Scanner::new(source)) {
            display_ast(&statements[0]).unwrap()
        } else {
            panic!("Failed to parse the source code")
        }
    }

    #[test]
    fn parse_string_expression() {
        let ast = parse(r#""My name is Luça";"#);
        assert_display_snapshot!(ast, @r###"
        Expression
         Literal
          String "My name is Luça"
        "###)
    }

    #[test]
    fn parse_number() {
        let ast = parse(r#"12.65;"#);
        assert_display_snapshot!(ast, @r###"
        Expression
         Literal
          Number 12.65
        "###)
    }

    #[test]
    fn parse_binary() {
        let ast = parse(r#"12.65 + 2;"#);
        assert_display_snapshot!(ast, @r###"
        Expression
         Binary
          Literal
           Number 12.65
          Plus
          Literal
           Number 2
        "###)
    }

    #[test]
    fn parse_ternary() {
        let ast = parse(r#"true ? 1 : 2;"#);
        assert_display_snapshot!(ast, @r###"
        Expression
         Ternary
          Literal
           True
          Literal
           Number 1
          Literal
           Number 2
        "###)
    }

    #[test]
    fn parse_comma_operator() {
        let ast = parse(r#"1, 2, 3;"#);
        assert_display_snapshot!(ast, @r###"
        Expression
         Binary
          Binary
           Literal
            Number 1
           Comma
           Literal
            Number 2
          Comma
          Literal
           Number 3
        "###)
    }

    #[test]
    fn parse_logical_statement() {
        let ast = parse(r#"true and 2+5 or true;"#);
        assert_display_snapshot!(ast, @r###"
        Expression
         Logical
          Logical
           Literal
            True
           And
           Binary
            Literal
             Number 2
            Plus
            Literal
             Number 5
          Or
          Literal
           True
        "###)
    }

    #[test]
    fn missing_left_operand_is_a_parse_error() {
        let result = Parser::parse(Scanner::new("== 2;"));
        assert!(result.is_err());
    }

    #[test]
    fn for_loop_is_not_desugared() {
        let result = Parser::parse(Scanner::new("for (var i = 0; i < 10; i = i + 1) print i;"));
        let statements = result.expect("should parse");
        assert!(matches!(statements[0], crate::parser::ast::Statement::For(_)));
    }

    #[test]
    fn class_with_trait_use_and_getter() {
        let result = Parser::parse(Scanner::new(
            "class Foo { use Bar, Baz; class identify() { return 1; } area { return 2; } }",
        ));
        assert!(result.is_ok());
    }
}
