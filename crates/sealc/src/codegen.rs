use log::{debug, trace};

use seal_bytecode::encode::{encode_register, encode_u32, MAX_REGISTERS};
use seal_bytecode::opcode::Opcode;
use seal_bytecode::value::Value;
use seal_bytecode::Chunk;

use crate::ast::*;
use crate::error::{CompileError, NameReason};
use crate::seq::Seq;
use crate::strings::StrRef;

pub fn emit(ast: &Ast) -> Result<Chunk, CompileError> {
    let mut gen = CodeGen::new(ast);
    gen.generate()?;
    Ok(gen.finish())
}

/// Structural register requirement of an expression: a leaf needs one
/// register, a binary node needs the larger of its operands' requirements,
/// plus one when both sides need the same amount.
///
/// Evaluation order is always left to right; this count is informational.
pub fn register_need(ast: &Ast, id: NodeId) -> u32 {
    // Children precede parents, so one forward pass sees every operand first.
    let nodes = &ast.nodes()[..=id.index()];
    let mut needs = vec![1; nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        if let NodeKind::BinOp { lhs, rhs, .. } = node.kind {
            needs[index] = combine_need(needs[lhs.index()], needs[rhs.index()]);
        }
    }
    needs[id.index()]
}

fn combine_need(left: u32, right: u32) -> u32 {
    if left == right {
        left + 1
    } else {
        left.max(right)
    }
}

/// Pending work while lowering one expression.
enum Step {
    Eval {
        id: NodeId,
        dest: Option<u32>,
    },
    Apply {
        op: BinOp,
        line: u32,
        mark: u32,
        dest: Option<u32>,
    },
}

/// A lowered operand and the register requirement of its subtree.
#[derive(Debug, Clone, Copy)]
struct Operand {
    reg: u32,
    need: u32,
}

/// Stack of register slots. Slots are handed out from the top and given
/// back in LIFO order.
#[derive(Debug, Default)]
struct Registers {
    top: u32,
    peak: u32,
}

impl Registers {
    fn alloc(&mut self) -> Result<u32, CompileError> {
        self.reserve(1)
    }

    /// Reserve `count` consecutive slots and return the first.
    fn reserve(&mut self, count: u32) -> Result<u32, CompileError> {
        let first = self.top;
        let end = first
            .checked_add(count)
            .filter(|end| *end <= MAX_REGISTERS)
            .ok_or(CompileError::ResourceLimit {
                register: MAX_REGISTERS,
            })?;
        self.top = end;
        self.peak = self.peak.max(end);
        Ok(first)
    }

    fn release_to(&mut self, mark: u32) {
        debug_assert!(mark <= self.top, "releasing registers that were never reserved");
        self.top = mark;
    }
}

/// Name bindings of one lexical block.
#[derive(Debug, Default)]
struct Frame {
    bindings: Seq<(StrRef, u32)>,
}

impl Frame {
    fn lookup(&self, name: StrRef) -> Option<u32> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == name)
            .map(|(_, reg)| *reg)
    }
}

/// Scope chain, innermost frame last. Each frame's parent is the one below
/// it.
#[derive(Debug, Default)]
struct Scopes {
    frames: Seq<Frame>,
}

impl Scopes {
    fn push(&mut self) -> Result<(), CompileError> {
        self.frames.push(Frame::default())?;
        Ok(())
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declared_here(&self, name: StrRef) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.lookup(name).is_some())
    }

    fn declare(&mut self, name: StrRef, reg: u32) -> Result<(), CompileError> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.bindings.push((name, reg))?;
                Ok(())
            }
            // Blocks push their frame before lowering any declaration.
            None => Err(CompileError::Codegen("declaration outside of any block".into())),
        }
    }

    fn resolve(&self, name: StrRef) -> Option<u32> {
        self.frames.iter().rev().find_map(|frame| frame.lookup(name))
    }
}

/// Lowers an [`Ast`] to a [`Chunk`].
///
/// The root block's frame and registers stay reserved after generation,
/// since nothing encloses it; nested blocks give theirs back on exit.
pub struct CodeGen<'a> {
    ast: &'a Ast,
    code: Seq<u8>,
    constants: Seq<Value>,
    registers: Registers,
    scopes: Scopes,
}

impl<'a> CodeGen<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        CodeGen {
            ast,
            code: Seq::new(),
            constants: Seq::new(),
            registers: Registers::default(),
            scopes: Scopes::default(),
        }
    }

    pub fn generate(&mut self) -> Result<(), CompileError> {
        let ast = self.ast;
        let NodeKind::Block { children } = &ast.node(ast.root).kind else {
            // The parser always roots the tree in a block.
            return Err(CompileError::Codegen("root node is not a block".into()));
        };
        self.gen_block(children, false)?;
        debug!(
            "generated {} bytes, {} constants, {} registers at peak",
            self.code.len(),
            self.constants.len(),
            self.registers.peak
        );
        Ok(())
    }

    /// Registers currently reserved.
    pub fn registers_in_use(&self) -> u32 {
        self.registers.top
    }

    pub fn finish(self) -> Chunk {
        Chunk {
            code: self.code.into_vec(),
            constants: self.constants.into_vec(),
            frame_size: self.registers.peak,
        }
    }

    fn gen_block(&mut self, children: &[NodeId], release: bool) -> Result<(), CompileError> {
        let ast = self.ast;
        let mark = self.registers.top;
        let locals = children
            .iter()
            .filter(|child| matches!(ast.node(**child).kind, NodeKind::VarDeclr { .. }))
            .count();
        let locals = u32::try_from(locals).map_err(|_| CompileError::ResourceLimit {
            register: MAX_REGISTERS,
        })?;
        let mut slot = self.registers.reserve(locals)?;
        self.scopes.push()?;

        for child in children {
            let node = ast.node(*child);
            match &node.kind {
                NodeKind::VarDeclr { name, value } => {
                    let line = node.line;
                    self.gen_var_declr(*name, *value, slot, line)?;
                    slot += 1;
                }
                _ => self.gen_statement(*child)?,
            }
        }

        if release {
            self.scopes.pop();
            self.registers.release_to(mark);
        }
        Ok(())
    }

    fn gen_statement(&mut self, id: NodeId) -> Result<(), CompileError> {
        let ast = self.ast;
        let node = ast.node(id);
        match &node.kind {
            NodeKind::Block { children } => self.gen_block(children, true),
            // Declarations are lowered by their block; the parser produces no
            // other statement forms.
            _ => Err(CompileError::Codegen(format!(
                "unexpected statement at line {}",
                node.line
            ))),
        }
    }

    fn gen_var_declr(
        &mut self,
        name: StrRef,
        value: NodeId,
        slot: u32,
        line: u32,
    ) -> Result<(), CompileError> {
        if self.scopes.declared_here(name) {
            return Err(self.name_error(name, NameReason::Duplicate, line));
        }
        // Bound only after the initializer, which still sees outer bindings.
        self.gen_expr(value, Some(slot))?;
        self.scopes.declare(name, slot)
    }

    /// Generate an expression and return the register holding its result.
    ///
    /// With a destination hint the result lands in `dest`. Without one, a
    /// variable access yields the variable's own register and anything else
    /// is written to a fresh slot. Operands are lowered left to right off an
    /// explicit work stack, so operator chains of any length are fine.
    fn gen_expr(&mut self, id: NodeId, dest: Option<u32>) -> Result<u32, CompileError> {
        let ast = self.ast;
        let mut steps = Seq::new();
        let mut operands: Seq<Operand> = Seq::new();
        steps.push(Step::Eval { id, dest })?;

        while let Some(step) = steps.pop() {
            match step {
                Step::Eval { id, dest } => {
                    let node = ast.node(id);
                    if let NodeKind::BinOp { op, lhs, rhs } = &node.kind {
                        // Temporaries for both operands are freed back to here.
                        steps.push(Step::Apply {
                            op: *op,
                            line: node.line,
                            mark: self.registers.top,
                            dest,
                        })?;
                        steps.push(Step::Eval { id: *rhs, dest: None })?;
                        steps.push(Step::Eval { id: *lhs, dest: None })?;
                    } else {
                        let reg = self.gen_leaf(id, dest)?;
                        operands.push(Operand { reg, need: 1 })?;
                    }
                }
                Step::Apply {
                    op,
                    line,
                    mark,
                    dest,
                } => {
                    let right = operands.pop();
                    let left = operands.pop();
                    let (Some(left), Some(right)) = (left, right) else {
                        return Err(CompileError::Codegen(format!(
                            "missing operand for binop at line {line}"
                        )));
                    };
                    let need = combine_need(left.need, right.need);
                    trace!("binop at line {line} needs {need} registers");
                    self.registers.release_to(mark);
                    let dest = self.dest_or_alloc(dest)?;
                    self.op(binop_opcode(op))?;
                    self.reg(dest)?;
                    self.reg(left.reg)?;
                    self.reg(right.reg)?;
                    operands.push(Operand { reg: dest, need })?;
                }
            }
        }

        operands
            .pop()
            .map(|operand| operand.reg)
            .ok_or_else(|| CompileError::Codegen("expression produced no value".into()))
    }

    fn gen_leaf(&mut self, id: NodeId, dest: Option<u32>) -> Result<u32, CompileError> {
        let ast = self.ast;
        let node = ast.node(id);
        match &node.kind {
            NodeKind::NumInt(value) => {
                let dest = self.dest_or_alloc(dest)?;
                self.emit_int(dest, *value)?;
                Ok(dest)
            }
            NodeKind::Access(name) => {
                let src = self
                    .scopes
                    .resolve(*name)
                    .ok_or_else(|| self.name_error(*name, NameReason::Undefined, node.line))?;
                match dest {
                    Some(dest) if dest != src => {
                        self.op(Opcode::Cpy)?;
                        self.reg(dest)?;
                        self.reg(src)?;
                        Ok(dest)
                    }
                    Some(dest) => Ok(dest),
                    None => Ok(src),
                }
            }
            // Only declarations hold expressions, and expressions never hold
            // statements.
            NodeKind::Block { .. } | NodeKind::VarDeclr { .. } | NodeKind::BinOp { .. } => {
                Err(CompileError::Codegen(format!(
                    "statement used as an expression at line {}",
                    node.line
                )))
            }
        }
    }

    fn dest_or_alloc(&mut self, dest: Option<u32>) -> Result<u32, CompileError> {
        match dest {
            Some(dest) => Ok(dest),
            None => self.registers.alloc(),
        }
    }

    fn emit_int(&mut self, dest: u32, value: i64) -> Result<(), CompileError> {
        match i8::try_from(value) {
            Ok(imm) => {
                self.op(Opcode::Ldi8)?;
                self.reg(dest)?;
                self.code.push(imm as u8)?;
            }
            Err(_) => {
                let index = self.constants.push(Value::Int(value))?;
                let index = u32::try_from(index).map_err(|_| CompileError::OutOfMemory)?;
                self.op(Opcode::Ldk)?;
                self.reg(dest)?;
                self.code.extend_from_slice(&encode_u32(index))?;
            }
        }
        Ok(())
    }

    fn op(&mut self, op: Opcode) -> Result<(), CompileError> {
        self.code.push(op.to_byte())?;
        Ok(())
    }

    fn reg(&mut self, reg: u32) -> Result<(), CompileError> {
        let encoded =
            encode_register(reg).map_err(|_| CompileError::ResourceLimit { register: reg })?;
        self.code.extend_from_slice(encoded.as_bytes())
    }

    fn name_error(&self, name: StrRef, reason: NameReason, line: u32) -> CompileError {
        CompileError::Name {
            line,
            name: self.ast.strings.text(name).into_owned(),
            reason,
        }
    }
}

fn binop_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::Add,
        BinOp::Sub => Opcode::Sub,
        BinOp::Mul => Opcode::Mul,
        BinOp::Div => Opcode::Div,
        BinOp::Mod => Opcode::Mod,
        BinOp::Pow => Opcode::Pow,
    }
}
