use std::ops::ControlFlow;

use tracing::{debug, info, trace};

use crate::{
    ast::{
        AssignValue, BinaryOp, BuiltinCall, CoordinateExpr, ExecTarget, Expr, ExprKind,
        Instruction, InstructionKind, LineInstruction, Program, Statement,
    },
    diagnostics::{Result, RuntimeError, RuntimeErrorKind},
    environment::SymbolTable,
    parser,
    position::{Coordinate, SourceSpan},
    value::Value,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Maximum number of statements to execute before cancelling.
    pub step_limit: Option<u64>,
}

/// The statement the interpreter is executing, or last executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub statement: usize,
    pub label: Coordinate,
}

/// Consulted before every statement; `Break` cancels the run.
pub trait StepHook {
    fn before_statement(&mut self, step: u64, cursor: &Cursor) -> ControlFlow<()>;
}

impl<F> StepHook for F
where
    F: FnMut(u64, &Cursor) -> ControlFlow<()>,
{
    fn before_statement(&mut self, step: u64, cursor: &Cursor) -> ControlFlow<()> {
        self(step, cursor)
    }
}

/// Allows at most `self.0` statements to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLimit(pub u64);

impl StepHook for StepLimit {
    fn before_statement(&mut self, step: u64, _cursor: &Cursor) -> ControlFlow<()> {
        if step >= self.0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

struct Unbounded;

impl StepHook for Unbounded {
    fn before_statement(&mut self, _step: u64, _cursor: &Cursor) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

enum Flow {
    Jump(usize),
    Halt,
}

#[derive(Debug, Default)]
pub struct Interpreter {
    symbols: SymbolTable,
    canvas: Vec<Coordinate>,
    cursor: Option<Cursor>,
    steps: u64,
    options: InterpreterOptions,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InterpreterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Points plotted by `LINE`, exec and `drawPixel`, in plotting order.
    pub fn canvas(&self) -> &[Coordinate] {
        &self.canvas
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Number of statements executed by the last run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn eval_source(&mut self, source: &str) -> Result<()> {
        let program = parser::parse_program(source)?;
        self.execute(&program)?;
        Ok(())
    }

    pub fn execute(&mut self, program: &Program) -> std::result::Result<(), RuntimeError> {
        match self.options.step_limit {
            Some(limit) => self.execute_with_hook(program, &mut StepLimit(limit)),
            None => self.execute_with_hook(program, &mut Unbounded),
        }
    }

    /// Runs `program` from its entry label, asking `hook` before each statement.
    pub fn execute_with_hook<H>(
        &mut self,
        program: &Program,
        hook: &mut H,
    ) -> std::result::Result<(), RuntimeError>
    where
        H: StepHook + ?Sized,
    {
        self.symbols = SymbolTable::new();
        self.canvas.clear();
        self.cursor = None;
        self.steps = 0;

        let entry = self.resolve_coordinate(&program.entry)?;
        let labels = program
            .statements
            .iter()
            .map(|statement| self.resolve_coordinate(&statement.label))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut index = labels
            .iter()
            .position(|label| *label == entry)
            .ok_or_else(|| {
                RuntimeError::new(
                    RuntimeErrorKind::UndefinedEntryPoint,
                    format!("no statement is labelled with entry point {entry}"),
                )
                .with_span(program.entry.span)
            })?;
        debug!(%entry, statement = index, "resolved entry point");

        loop {
            let cursor = Cursor {
                statement: index,
                label: labels[index],
            };
            self.cursor = Some(cursor);
            if hook.before_statement(self.steps, &cursor).is_break() {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::Cancelled,
                    format!(
                        "execution cancelled after {} steps at {}",
                        self.steps, cursor.label
                    ),
                )
                .with_span(program.statements[index].label.span));
            }
            self.steps += 1;
            trace!(label = %cursor.label, statement = index, "executing statement");

            match self.execute_statement(&program.statements[index], &labels)? {
                Flow::Jump(next) => index = next,
                Flow::Halt => {
                    info!(steps = self.steps, plotted = self.canvas.len(), "program halted");
                    return Ok(());
                }
            }
        }
    }

    fn execute_statement(
        &mut self,
        statement: &Statement,
        labels: &[Coordinate],
    ) -> std::result::Result<Flow, RuntimeError> {
        for instruction in &statement.body {
            if let Some(flow) = self.execute_instruction(instruction, labels)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Halt)
    }

    fn execute_instruction(
        &mut self,
        instruction: &Instruction,
        labels: &[Coordinate],
    ) -> std::result::Result<Option<Flow>, RuntimeError> {
        match &instruction.kind {
            InstructionKind::Allocation(allocation) => {
                self.symbols.define(allocation.name.clone(), Value::Empty);
            }
            InstructionKind::Assign { name, value } => {
                let value = self.evaluate_assign_value(value)?;
                self.symbols.define(name.clone(), value);
            }
            InstructionKind::Line(line) => {
                let points = self.evaluate_line(line)?;
                self.canvas.extend(points);
            }
            InstructionKind::Goto(target) => {
                let coordinate = self.resolve_coordinate(target)?;
                let next = labels
                    .iter()
                    .position(|label| *label == coordinate)
                    .ok_or_else(|| {
                        RuntimeError::new(
                            RuntimeErrorKind::UnreachableGotoTarget,
                            format!("no statement is labelled {coordinate}"),
                        )
                        .with_span(target.span)
                    })?;
                debug!(target = %coordinate, statement = next, "goto");
                return Ok(Some(Flow::Jump(next)));
            }
            InstructionKind::Exec(target) => {
                self.exec(target)?;
                return Ok(Some(Flow::Halt));
            }
        }
        Ok(None)
    }

    fn exec(&mut self, target: &ExecTarget) -> std::result::Result<(), RuntimeError> {
        match target {
            ExecTarget::Variable { name, span } => match self.symbols.lookup(name, *span)? {
                Value::Line(points) => self.canvas.extend_from_slice(points),
                Value::Empty => {}
                other => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::TypeMismatch,
                        format!("cannot execute `{name}` holding a {}", other.type_name()),
                    )
                    .with_span(*span));
                }
            },
            ExecTarget::Builtin(BuiltinCall::DrawPixel { at, .. }) => {
                let point = self.resolve_coordinate(at)?;
                self.canvas.push(point);
            }
        }
        Ok(())
    }

    fn evaluate_assign_value(
        &self,
        value: &AssignValue,
    ) -> std::result::Result<Value, RuntimeError> {
        match value {
            AssignValue::Allocation(_) => Ok(Value::Empty),
            AssignValue::Line(line) => Ok(Value::Line(self.evaluate_line(line)?)),
            AssignValue::Expr(Expr {
                kind: ExprKind::Variable(name),
                span,
            }) => Ok(self.symbols.lookup(name, *span)?.clone()),
            AssignValue::Expr(expr) => Ok(Value::Number(self.evaluate(expr)?)),
        }
    }

    /// Sweeps `start + t * vector` for `t` in `[range_start, range_end)` by `range_step`.
    pub fn evaluate_line(
        &self,
        line: &LineInstruction,
    ) -> std::result::Result<Vec<Coordinate>, RuntimeError> {
        let start = self.resolve_coordinate(&line.start)?;
        let vector = self.resolve_coordinate(&line.vector)?;
        let from = line.range_start.value.as_int();
        let to = line.range_end.value.as_int();
        let step = line.range_step.value.as_int();

        if step == 0 {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidLineRange,
                format!("range {from}..{to} with step 0 never terminates"),
            )
            .with_span(line.range_step.token.span));
        }

        let mut points = Vec::new();
        let mut t = from;
        while t < to {
            points.push(sweep_point(start, vector, t, line.span)?);
            t = match t.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(points)
    }

    fn resolve_coordinate(
        &self,
        coordinate: &CoordinateExpr,
    ) -> std::result::Result<Coordinate, RuntimeError> {
        Ok(Coordinate {
            x: self.evaluate(&coordinate.x)?,
            y: self.evaluate(&coordinate.y)?,
            z: self.evaluate(&coordinate.z)?,
        })
    }

    fn evaluate(&self, expr: &Expr) -> std::result::Result<i64, RuntimeError> {
        match &expr.kind {
            ExprKind::Number(literal) => Ok(literal.value.as_int()),
            ExprKind::Variable(name) => {
                let value = self.symbols.lookup(name, expr.span)?;
                value.as_number().ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::TypeMismatch,
                        format!(
                            "expected a number in `{name}`, found {}",
                            value.type_name()
                        ),
                    )
                    .with_span(expr.span)
                })
            }
            ExprKind::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*op, left, right, expr.span)
            }
        }
    }
}

fn binary(
    op: BinaryOp,
    left: i64,
    right: i64,
    span: SourceSpan,
) -> std::result::Result<i64, RuntimeError> {
    let result = match op {
        BinaryOp::Add => left.checked_add(right),
        BinaryOp::Sub => left.checked_sub(right),
        BinaryOp::Mul => left.checked_mul(right),
        BinaryOp::Div => {
            if right == 0 {
                return Err(
                    RuntimeError::new(RuntimeErrorKind::DivisionByZero, "division by zero")
                        .with_span(span),
                );
            }
            left.checked_div(right)
        }
    };
    result.ok_or_else(|| overflow(span))
}

fn sweep_point(
    start: Coordinate,
    vector: Coordinate,
    t: i64,
    span: SourceSpan,
) -> std::result::Result<Coordinate, RuntimeError> {
    let axis = |origin: i64, delta: i64| {
        delta
            .checked_mul(t)
            .and_then(|offset| origin.checked_add(offset))
            .ok_or_else(|| overflow(span))
    };
    Ok(Coordinate {
        x: axis(start.x, vector.x)?,
        y: axis(start.y, vector.y)?,
        z: axis(start.z, vector.z)?,
    })
}

fn overflow(span: SourceSpan) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::ArithmeticOverflow, "arithmetic overflow").with_span(span)
}
