// monkey-vm - Bytecode compiler
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! AST to bytecode compilation.
//!
//! The compiler keeps a stack of compilation scopes (one per function
//! literal being compiled), a shared constant pool, and the current
//! symbol table. Jumps are backpatched in place, which works because all
//! jump operands are fixed two-byte widths.

use std::fmt;
use std::rc::Rc;

use monkey_code::{Instructions, Opcode, make};
use monkey_core::builtins::BUILTINS;
use monkey_core::object::{CompiledFunction, Object};
use monkey_parser::ast::{Block, Expr, Program, Stmt};
use monkey_parser::token::{Span, TokenKind};

use crate::symbols::{SymbolScope, SymbolTable};

/// Error aborting a compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// An identifier that resolves to nothing.
    UnknownIdentifier { name: String, span: Span },
    /// An operator with no opcode mapping.
    UnknownOperator { op: TokenKind, span: Span },
    /// `...` referenced outside a variadic function.
    VarArgsOutsideVariadic { span: Span },
}

impl CompileError {
    /// The source span the error is anchored to.
    pub fn span(&self) -> Span {
        match self {
            CompileError::UnknownIdentifier { span, .. }
            | CompileError::UnknownOperator { span, .. }
            | CompileError::VarArgsOutsideVariadic { span } => *span,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnknownIdentifier { name, .. } => {
                write!(f, "Unknown identifier {}", name)
            }
            CompileError::UnknownOperator { op, .. } => {
                write!(f, "Unhandled operator {}", op)
            }
            CompileError::VarArgsOutsideVariadic { .. } => {
                write!(f, "`...` is only valid inside a variadic function")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// The name under which a variadic function's carrier slot is defined.
/// `...` compiles to an ordinary resolution of this symbol, so the
/// carrier is capturable as a free variable like any other local.
const VAR_ARGS_NAME: &str = "...";

/// The output of a compilation: a flat instruction stream plus the
/// constant pool it references.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

/// Instruction stream state for one function literal under compilation.
#[derive(Debug, Default)]
struct CompilationScope {
    instructions: Instructions,
    last: Option<EmittedInstruction>,
    previous: Option<EmittedInstruction>,
}

/// The bytecode compiler.
pub struct Compiler {
    constants: Vec<Object>,
    symbols: SymbolTable,
    scopes: Vec<CompilationScope>,
}

impl Compiler {
    /// Create a compiler with a fresh symbol table, pre-populated with the
    /// builtin registration table.
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        for (index, builtin) in BUILTINS.iter().enumerate() {
            symbols.define_builtin(index, builtin.name);
        }
        Self::with_state(symbols, Vec::new())
    }

    /// Create a compiler continuing from existing state. The REPL uses
    /// this to keep the symbol table and constant pool alive across lines.
    pub fn with_state(symbols: SymbolTable, constants: Vec<Object>) -> Self {
        Compiler {
            constants,
            symbols,
            scopes: vec![CompilationScope::default()],
        }
    }

    /// Release the symbol table and constant pool for the next compile.
    pub fn into_state(self) -> (SymbolTable, Vec<Object>) {
        (self.symbols, self.constants)
    }

    /// Compile a program into the main scope.
    pub fn compile(&mut self, program: &Program) -> Result<()> {
        for stmt in &program.statements {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    /// The compiled main-scope instructions and the constant pool.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.scopes[0].instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.compile_expr(expr)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Stmt::Let { name, value, .. } => {
                self.compile_expr(value)?;
                // Defined after the value compiles: the name is not in
                // scope inside its own initializer.
                let symbol = self.symbols.define(&name.name);
                if symbol.scope == SymbolScope::Local {
                    self.emit(Opcode::SetLocal, &[symbol.index]);
                } else {
                    self.emit(Opcode::SetGlobal, &[symbol.index]);
                }
                Ok(())
            }
            Stmt::Return { value, .. } => {
                match value {
                    Some(value) => {
                        self.compile_expr(value)?;
                        self.emit(Opcode::ReturnValue, &[]);
                    }
                    None => {
                        self.emit(Opcode::Return, &[]);
                    }
                }
                Ok(())
            }
        }
    }

    fn compile_block(&mut self, block: &Block) -> Result<()> {
        for stmt in &block.stmts {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn compile_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Int { value, .. } => {
                let idx = self.add_constant(Object::Integer(*value));
                self.emit(Opcode::Constant, &[idx]);
                Ok(())
            }
            Expr::Str { value, .. } => {
                let idx = self.add_constant(Object::str(value));
                self.emit(Opcode::Constant, &[idx]);
                Ok(())
            }
            Expr::Bool { value, .. } => {
                self.emit(if *value { Opcode::True } else { Opcode::False }, &[]);
                Ok(())
            }
            Expr::Ident(ident) => {
                let Some(symbol) = self.symbols.resolve(&ident.name) else {
                    return Err(CompileError::UnknownIdentifier {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                };
                self.load_symbol(&symbol.scope, symbol.index);
                Ok(())
            }
            Expr::VarArgs { span } => {
                // Reads the carrier slot defined by the enclosing variadic
                // function literal (possibly as a free variable).
                let Some(symbol) = self.symbols.resolve(VAR_ARGS_NAME) else {
                    return Err(CompileError::VarArgsOutsideVariadic { span: *span });
                };
                self.load_symbol(&symbol.scope, symbol.index);
                Ok(())
            }
            Expr::Prefix { op, rhs, span } => {
                self.compile_expr(rhs)?;
                match op {
                    TokenKind::Minus => self.emit(Opcode::Minus, &[]),
                    TokenKind::Bang => self.emit(Opcode::Bang, &[]),
                    _ => {
                        return Err(CompileError::UnknownOperator {
                            op: *op,
                            span: *span,
                        });
                    }
                };
                Ok(())
            }
            Expr::Infix { op, lhs, rhs, span } => self.compile_infix(*op, lhs, rhs, *span),
            Expr::If {
                cond,
                consequence,
                alternative,
                ..
            } => self.compile_if(cond, consequence, alternative.as_ref()),
            Expr::Array { elems, .. } => {
                for elem in elems {
                    self.compile_expr(elem)?;
                }
                self.emit(Opcode::Array, &[elems.len()]);
                Ok(())
            }
            Expr::Map { pairs, .. } => {
                // Deterministic emission order: sort pairs by the canonical
                // string form of their keys so bytecode is stable however
                // the source ordered them.
                let mut sorted: Vec<&(Expr, Expr)> = pairs.iter().collect();
                sorted.sort_by_key(|(key, _)| key.to_string());

                for (key, value) in sorted {
                    self.compile_expr(key)?;
                    self.compile_expr(value)?;
                }
                self.emit(Opcode::Hash, &[pairs.len()]);
                Ok(())
            }
            Expr::Index { obj, index, .. } => {
                self.compile_expr(obj)?;
                self.compile_expr(index)?;
                self.emit(Opcode::Index, &[]);
                Ok(())
            }
            Expr::Range { start, end, .. } => {
                self.compile_expr(start)?;
                self.compile_expr(end)?;
                self.emit(Opcode::Range, &[]);
                Ok(())
            }
            Expr::Fn {
                params,
                variadic,
                body,
                ..
            } => self.compile_fn_literal(params, *variadic, body),
            Expr::Call { callee, args, .. } => {
                for arg in args {
                    self.compile_expr(arg)?;
                }
                // The argument count travels on the stack, as an Integer
                // pushed between the arguments and the callee.
                let idx = self.add_constant(Object::Integer(args.len() as i64));
                self.emit(Opcode::Constant, &[idx]);

                self.compile_expr(callee)?;
                self.emit(Opcode::Call, &[]);
                Ok(())
            }
        }
    }

    fn compile_infix(&mut self, op: TokenKind, lhs: &Expr, rhs: &Expr, span: Span) -> Result<()> {
        // `a < b` compiles as `b > a`; there is no OpLessThan.
        if op == TokenKind::Lt {
            self.compile_expr(rhs)?;
            self.compile_expr(lhs)?;
            self.emit(Opcode::GreaterThan, &[]);
            return Ok(());
        }

        self.compile_expr(lhs)?;
        self.compile_expr(rhs)?;

        match op {
            TokenKind::Plus => self.emit(Opcode::Add, &[]),
            TokenKind::Minus => self.emit(Opcode::Sub, &[]),
            TokenKind::Asterisk => self.emit(Opcode::Mul, &[]),
            TokenKind::Slash => self.emit(Opcode::Div, &[]),
            TokenKind::Gt => self.emit(Opcode::GreaterThan, &[]),
            TokenKind::Eq => self.emit(Opcode::Equal, &[]),
            TokenKind::NotEq => self.emit(Opcode::NotEqual, &[]),
            _ => return Err(CompileError::UnknownOperator { op, span }),
        };
        Ok(())
    }

    /// If/else compiles to a conditional jump over the consequence and an
    /// unconditional jump over the alternative. Blocks are expressions, so
    /// a trailing `Pop` inside either branch is stripped, and a missing
    /// alternative becomes `Null`.
    fn compile_if(
        &mut self,
        cond: &Expr,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> Result<()> {
        self.compile_expr(cond)?;

        let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[9999]);

        self.compile_block(consequence)?;
        if self.last_is(Opcode::Pop) {
            self.remove_last();
        }

        let jump = self.emit(Opcode::Jump, &[9999]);
        let after_consequence = self.current_instructions().len();
        self.change_operand(jump_not_truthy, after_consequence);

        match alternative {
            Some(alternative) => {
                self.compile_block(alternative)?;
                if self.last_is(Opcode::Pop) {
                    self.remove_last();
                }
            }
            None => {
                self.emit(Opcode::Null, &[]);
            }
        }

        let after_alternative = self.current_instructions().len();
        self.change_operand(jump, after_alternative);
        Ok(())
    }

    fn compile_fn_literal(&mut self, params: &[monkey_parser::ast::Ident], variadic: bool, body: &Block) -> Result<()> {
        self.enter_scope();

        for param in params {
            self.symbols.define(&param.name);
        }
        if variadic {
            // The carrier occupies the slot right after the named
            // parameters; the VM packs it there at call time.
            self.symbols.define(VAR_ARGS_NAME);
        }

        self.compile_block(body)?;

        if self.last_is(Opcode::Pop) {
            self.remove_last();
            self.emit(Opcode::ReturnValue, &[]);
        } else if !self.last_is(Opcode::ReturnValue) && !self.last_is(Opcode::Return) {
            self.emit(Opcode::Return, &[]);
        }

        let free_symbols = self.symbols.free_symbols.clone();
        let num_locals = self.symbols.num_definitions;
        let instructions = self.exit_scope();

        // Load each captured binding in the enclosing scope, in capture
        // order; OpClosure collects them off the stack.
        for free in &free_symbols {
            self.load_symbol(&free.scope, free.index);
        }

        let idx = self.add_constant(Object::CompiledFunction(Rc::new(CompiledFunction {
            instructions,
            num_locals,
            num_args: params.len(),
            variadic,
        })));
        self.emit(Opcode::Closure, &[idx, free_symbols.len()]);
        Ok(())
    }

    fn load_symbol(&mut self, scope: &SymbolScope, index: usize) {
        match scope {
            SymbolScope::Global => self.emit(Opcode::GetGlobal, &[index]),
            SymbolScope::Local => self.emit(Opcode::GetLocal, &[index]),
            SymbolScope::Builtin => self.emit(Opcode::GetBuiltin, &[index]),
            SymbolScope::Free => self.emit(Opcode::GetFree, &[index]),
        };
    }

    // ========================================================================
    // Emission
    // ========================================================================

    fn current_scope(&mut self) -> &mut CompilationScope {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    fn current_instructions(&self) -> &Instructions {
        &self.scopes.last().expect("scope stack is never empty").instructions
    }

    /// Append an instruction to the current scope; returns its offset.
    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let instruction = make(op, operands);
        let scope = self.current_scope();
        let position = scope.instructions.len();
        scope.instructions.0.extend(instruction);

        scope.previous = scope.last;
        scope.last = Some(EmittedInstruction {
            opcode: op,
            position,
        });
        position
    }

    fn add_constant(&mut self, value: Object) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    fn last_is(&self, op: Opcode) -> bool {
        self.scopes
            .last()
            .and_then(|scope| scope.last)
            .is_some_and(|last| last.opcode == op)
    }

    /// Drop the most recently emitted instruction.
    fn remove_last(&mut self) {
        let scope = self.current_scope();
        let last = scope.last.expect("no instruction to remove");
        scope.instructions.0.truncate(last.position);
        scope.last = scope.previous;
        scope.previous = None;
    }

    /// Re-encode the instruction at `position` with a new operand. Only
    /// used for jump patching; operand widths are fixed, so the rewrite
    /// fits in place.
    fn change_operand(&mut self, position: usize, operand: usize) {
        let scope = self.current_scope();
        let op = Opcode::from_u8(scope.instructions.0[position])
            .expect("patching a position that holds no opcode");
        let instruction = make(op, &[operand]);
        scope.instructions.0[position..position + instruction.len()]
            .copy_from_slice(&instruction);
    }

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::default());
        let symbols = std::mem::take(&mut self.symbols);
        self.symbols = SymbolTable::enclosed(symbols);
    }

    fn exit_scope(&mut self) -> Instructions {
        let scope = self.scopes.pop().expect("scope stack is never empty");
        let symbols = std::mem::take(&mut self.symbols);
        self.symbols = symbols
            .into_parent()
            .expect("exiting a scope with no parent");
        scope.instructions
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
