use crate::{lexer::Token, position::SourceSpan};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Integer view of the literal; floats truncate toward zero.
    pub fn as_int(self) -> i64 {
        match self {
            Number::Int(n) => n,
            Number::Float(f) => f as i64,
        }
    }
}

/// A numeric literal together with the token it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub token: Token,
    pub value: Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(NumberLiteral),
    Variable(String),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

/// Unresolved `[x:y:z]` made of three expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateExpr {
    pub x: Expr,
    pub y: Expr,
    pub z: Expr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineInstruction {
    pub start: CoordinateExpr,
    pub vector: CoordinateExpr,
    pub range_start: NumberLiteral,
    pub range_end: NumberLiteral,
    pub range_step: NumberLiteral,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    Allocation(Allocation),
    Line(LineInstruction),
    /// A lone identifier copies the binding; anything else must be numeric.
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecTarget {
    Variable { name: String, span: SourceSpan },
    Builtin(BuiltinCall),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinCall {
    DrawPixel { at: CoordinateExpr, span: SourceSpan },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    Allocation(Allocation),
    Assign { name: String, value: AssignValue },
    Line(LineInstruction),
    Goto(CoordinateExpr),
    Exec(ExecTarget),
}

impl InstructionKind {
    /// Goto and exec close the instruction list of a statement.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstructionKind::Goto(_) | InstructionKind::Exec(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub label: CoordinateExpr,
    pub body: Vec<Instruction>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub entry: CoordinateExpr,
    pub statements: Vec<Statement>,
}
