//! Tree-walk evaluator.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::{Expr, Literal, Stmt};
use crate::env::Environment;
use crate::token::{Token, TokenKind};

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Function(Function),
}

impl Value {
    /// Only `nil` and `false` are falsey; `0` and `""` are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Function(l), Value::Function(r)) => l == r,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            // f64's Display prints integral values without a fractional part.
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Function(function) => write!(f, "{}", function),
        }
    }
}

/// A callable value: a user-declared function or a native.
#[derive(Clone)]
pub struct Function {
    name: String,
    arity: usize,
    body: FunctionBody,
}

#[derive(Clone)]
enum FunctionBody {
    Native(fn(&[Value]) -> Value),
    User(Rc<FunctionDecl>),
}

#[derive(Debug)]
struct FunctionDecl {
    params: Vec<Token>,
    body: Vec<Stmt>,
}

impl Function {
    fn native(name: &str, arity: usize, body: fn(&[Value]) -> Value) -> Function {
        Function {
            name: name.to_string(),
            arity,
            body: FunctionBody::Native(body),
        }
    }

    fn user(name: &str, params: Vec<Token>, body: Vec<Stmt>) -> Function {
        Function {
            name: name.to_string(),
            arity: params.len(),
            body: FunctionBody::User(Rc::new(FunctionDecl { params, body })),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Callables compare by identity, not structure.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (&self.body, &other.body) {
            (FunctionBody::User(l), FunctionBody::User(r)) => Rc::ptr_eq(l, r),
            (FunctionBody::Native(_), FunctionBody::Native(_)) => {
                self.name == other.name && self.arity == other.arity
            }
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body {
            FunctionBody::Native(_) => write!(f, "<native fn>"),
            FunctionBody::User(_) => write!(f, "<fn {}>", self.name),
        }
    }
}

/// Errors raised during evaluation. Each language-level error carries the
/// source line of the token it is attributed to.
#[derive(Debug)]
pub enum RuntimeError {
    NumberOperand { line: usize },
    NumberOperands { line: usize },
    AddOperands { line: usize },
    UndefinedVariable { name: String, line: usize },
    NotCallable { line: usize },
    Arity { expected: usize, got: usize, line: usize },
    Io(io::Error),
}

impl RuntimeError {
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::NumberOperand { line }
            | RuntimeError::NumberOperands { line }
            | RuntimeError::AddOperands { line }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::NotCallable { line }
            | RuntimeError::Arity { line, .. } => Some(*line),
            RuntimeError::Io(_) => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::NumberOperand { .. } => write!(f, "Operand must be a number."),
            RuntimeError::NumberOperands { .. } => write!(f, "Operands must be numbers."),
            RuntimeError::AddOperands { .. } => {
                write!(f, "Operands must be two numbers or two strings.")
            }
            RuntimeError::UndefinedVariable { name, .. } => {
                write!(f, "Undefined variable '{}'.", name)
            }
            RuntimeError::NotCallable { .. } => {
                write!(f, "Can only call functions and classes.")
            }
            RuntimeError::Arity { expected, got, .. } => {
                write!(f, "Expected {} arguments but got {}.", expected, got)
            }
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

/// Non-local transfer unwinding the evaluation stack: either a runtime
/// error headed for the `interpret` boundary or a `return` headed for the
/// nearest function call. The two never mix.
#[derive(Debug)]
enum Unwind {
    Error(RuntimeError),
    Return(Value),
}

impl From<RuntimeError> for Unwind {
    fn from(e: RuntimeError) -> Unwind {
        Unwind::Error(e)
    }
}

impl From<io::Error> for Unwind {
    fn from(e: io::Error) -> Unwind {
        Unwind::Error(RuntimeError::Io(e))
    }
}

/// Walks statements and expressions, writing program output to `output`.
///
/// Holds the global environment, which outlives individual `interpret`
/// calls so that a session accumulates definitions.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Environment>,
    echo_expressions: bool,
}

impl<'t, W: Write> Evaluator<'t, W> {
    /// When `echo_expressions` is set, the value of a top-level expression
    /// statement is printed, the way an interactive session answers back.
    pub fn new(output: &'t mut W, echo_expressions: bool) -> Evaluator<'t, W> {
        let globals = Environment::global();
        globals.define(
            "clock",
            Value::Function(Function::native("clock", 0, builtin_clock)),
        );
        Evaluator {
            output,
            globals,
            echo_expressions,
        }
    }

    /// Execute a program against the global environment.
    ///
    /// This is the catching boundary for runtime errors. A `return` at the
    /// top level stops the remaining statements without error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            match self.execute_top_level(stmt) {
                Ok(()) => (),
                Err(Unwind::Return(_)) => break,
                Err(Unwind::Error(e)) => return Err(e),
            }
        }
        Ok(())
    }

    fn execute_top_level(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        if self.echo_expressions {
            if let Stmt::Expression(expr) = stmt {
                let value = self.eval_expr(expr, self.globals.clone())?;
                writeln!(self.output, "{}", value)?;
                return Ok(());
            }
        }
        self.execute(stmt, self.globals.clone())
    }

    fn execute(&mut self, stmt: &Stmt, env: Rc<Environment>) -> Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.eval_expr(expr, env)?;
            }
            Stmt::Print(expr) => {
                let value = self.eval_expr(expr, env)?;
                writeln!(self.output, "{}", value)?;
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.eval_expr(expr, env.clone())?,
                    None => Value::Nil,
                };
                env.define(&name.lexeme, value);
            }
            Stmt::Block(statements) => {
                let scope = Environment::with_parent(env);
                for stmt in statements {
                    self.execute(stmt, scope.clone())?;
                }
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.eval_expr(condition, env.clone())?.is_truthy() {
                    self.execute(then_branch, env)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, env)?;
                }
            }
            Stmt::While(condition, body) => {
                while self.eval_expr(condition, env.clone())?.is_truthy() {
                    self.execute(body, env.clone())?;
                }
            }
            Stmt::Function(name, params, body) => {
                let function = Function::user(&name.lexeme, params.clone(), body.clone());
                env.define(&name.lexeme, Value::Function(function));
            }
            Stmt::Return(_keyword, value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Nil,
                };
                return Err(Unwind::Return(value));
            }
        };
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr, env: Rc<Environment>) -> Result<Value, Unwind> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Nil => Value::Nil,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::Str(s) => Value::Str(s.clone()),
            }),
            Expr::Grouping(inner) => self.eval_expr(inner, env),
            Expr::Unary(op, right) => {
                let right = self.eval_expr(right, env)?;
                match op.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::NumberOperand { line: op.line }.into()),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
                    _ => unreachable!(),
                }
            }
            Expr::Binary(left, op, right) => {
                let l = self.eval_expr(left, env.clone())?;
                let r = self.eval_expr(right, env)?;
                match op.kind {
                    TokenKind::Plus => match (l, r) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                        _ => Err(RuntimeError::AddOperands { line: op.line }.into()),
                    },
                    TokenKind::Minus => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Number(a - b))
                    }
                    TokenKind::Star => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Number(a * b))
                    }
                    // Division follows IEEE-754; dividing by zero is not an error.
                    TokenKind::Slash => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Number(a / b))
                    }
                    TokenKind::Greater => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Bool(a > b))
                    }
                    TokenKind::GreaterEqual => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Bool(a >= b))
                    }
                    TokenKind::Less => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Bool(a < b))
                    }
                    TokenKind::LessEqual => {
                        let (a, b) = number_operands(op, l, r)?;
                        Ok(Value::Bool(a <= b))
                    }
                    TokenKind::EqualEqual => Ok(Value::Bool(l == r)),
                    TokenKind::BangEqual => Ok(Value::Bool(l != r)),
                    _ => unreachable!(),
                }
            }
            Expr::Logical(left, op, right) => {
                let left = self.eval_expr(left, env.clone())?;
                if op.kind == TokenKind::Or {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                } else if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expr(right, env)
            }
            Expr::Variable(name) => match env.get(&name.lexeme) {
                Some(value) => Ok(value),
                None => Err(RuntimeError::UndefinedVariable {
                    name: name.lexeme.clone(),
                    line: name.line,
                }
                .into()),
            },
            Expr::Assign(name, value_expr) => {
                let value = self.eval_expr(value_expr, env.clone())?;
                if env.assign(&name.lexeme, value.clone()) {
                    Ok(value)
                } else {
                    Err(RuntimeError::UndefinedVariable {
                        name: name.lexeme.clone(),
                        line: name.line,
                    }
                    .into())
                }
            }
            Expr::Call(callee, paren, args) => {
                let callee = self.eval_expr(callee, env.clone())?;
                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.eval_expr(arg, env.clone())?);
                }
                match callee {
                    Value::Function(function) => self.call_function(&function, arguments, paren),
                    _ => Err(RuntimeError::NotCallable { line: paren.line }.into()),
                }
            }
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, Unwind> {
        if arguments.len() != function.arity {
            return Err(RuntimeError::Arity {
                expected: function.arity,
                got: arguments.len(),
                line: paren.line,
            }
            .into());
        }
        match &function.body {
            FunctionBody::Native(native) => Ok(native(&arguments)),
            FunctionBody::User(decl) => {
                // Each call gets a fresh frame parented to the globals:
                // function bodies see global state, not the caller's scope.
                let frame = Environment::with_parent(self.globals.clone());
                for (param, value) in decl.params.iter().zip(arguments) {
                    frame.define(&param.lexeme, value);
                }
                for stmt in &decl.body {
                    match self.execute(stmt, frame.clone()) {
                        Ok(()) => (),
                        Err(Unwind::Return(value)) => return Ok(value),
                        Err(err) => return Err(err),
                    }
                }
                Ok(Value::Nil)
            }
        }
    }
}

fn number_operands(op: &Token, l: Value, r: Value) -> Result<(f64, f64), RuntimeError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(RuntimeError::NumberOperands { line: op.line }),
    }
}

fn builtin_clock(_args: &[Value]) -> Value {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Value::Number(elapsed.as_secs_f64())
}
