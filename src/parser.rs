use tracing::debug;

use crate::{
    ast::{
        Allocation, AssignValue, BinaryOp, BuiltinCall, CoordinateExpr, ExecTarget, Expr,
        ExprKind, Instruction, InstructionKind, LineInstruction, Number, NumberLiteral, Program,
        Statement,
    },
    diagnostics::{Result, SyntaxError},
    lexer::{self, Keyword, Token, TokenKind},
    position::SourceSpan,
};

/// Lexes and parses `source` in one go.
pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    Ok(parse(tokens)?)
}

/// Builds a [`Program`] from a token sequence ending in `Eof`.
pub fn parse(tokens: Vec<Token>) -> std::result::Result<Program, SyntaxError> {
    let program = Parser::new(tokens).parse_program()?;
    debug!(
        statements = program.statements.len(),
        "parsed program"
    );
    Ok(program)
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

type ParseResult<T> = std::result::Result<T, SyntaxError>;

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                span: SourceSpan::new(end, end),
            });
        }
        Self { tokens, current: 0 }
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        self.consume_keyword(Keyword::ZetriScript)?;
        self.consume(TokenKind::Bang, "`!` after the opening keyword")?;
        let entry = self.parse_coordinate()?;

        let mut statements = Vec::new();
        if self.check(TokenKind::Colon) {
            // The entry coordinate doubles as the first statement's label.
            let statement = self.parse_statement_body(entry.clone())?;
            statements.push(statement);
        }
        while self.check(TokenKind::LBracket) {
            statements.push(self.parse_statement()?);
        }

        if !self.check(TokenKind::Keyword(Keyword::ZetriScript)) {
            return Err(self.error("`[` to start a statement or closing keyword `ZetriScript`"));
        }
        self.advance();
        self.consume(TokenKind::Eof, "end of input after closing `ZetriScript`")?;

        Ok(Program { entry, statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let label = self.parse_coordinate()?;
        self.parse_statement_body(label)
    }

    fn parse_statement_body(&mut self, label: CoordinateExpr) -> ParseResult<Statement> {
        self.consume(TokenKind::Colon, "`:` after statement label")?;
        let mut body = Vec::new();
        loop {
            let instruction = self.parse_instruction()?;
            let terminal = instruction.kind.is_terminal();
            body.push(instruction);
            if terminal {
                break;
            }
        }
        let end = self.previous().span.end;
        Ok(Statement {
            span: SourceSpan::new(label.span.start, end),
            label,
            body,
        })
    }

    fn parse_instruction(&mut self) -> ParseResult<Instruction> {
        let start = self.peek().span.start;
        let kind = match self.peek().kind {
            TokenKind::Keyword(Keyword::AllocSpace) => {
                let allocation = self.parse_allocation()?;
                self.consume(TokenKind::Semicolon, "`;` after `allocSpace(...)`")?;
                InstructionKind::Allocation(allocation)
            }
            TokenKind::Keyword(Keyword::Line) => {
                let line = self.parse_line()?;
                self.consume(TokenKind::Semicolon, "`;` after `LINE(...)`")?;
                InstructionKind::Line(line)
            }
            TokenKind::Keyword(Keyword::Goto) => {
                self.advance();
                let target = self.parse_coordinate()?;
                self.consume(TokenKind::Bang, "`!` after goto target")?;
                InstructionKind::Goto(target)
            }
            TokenKind::Keyword(Keyword::DrawPixel) => {
                let call = self.parse_builtin_call()?;
                self.consume(TokenKind::Bang, "`!` after built-in call")?;
                InstructionKind::Exec(ExecTarget::Builtin(call))
            }
            TokenKind::Identifier => match self.peek_next().kind {
                TokenKind::Assign => self.parse_assignment()?,
                TokenKind::Bang => {
                    let name = self.advance();
                    self.advance();
                    InstructionKind::Exec(ExecTarget::Variable {
                        name: name.lexeme,
                        span: name.span,
                    })
                }
                _ => {
                    self.advance();
                    return Err(self.error("`=` or `!` after identifier"));
                }
            },
            _ => return Err(self.error("instruction")),
        };
        Ok(Instruction {
            kind,
            span: SourceSpan::new(start, self.previous().span.end),
        })
    }

    fn parse_assignment(&mut self) -> ParseResult<InstructionKind> {
        let name = self.consume(TokenKind::Identifier, "variable name")?;
        self.consume(TokenKind::Assign, "`=` in assignment")?;
        let value = match self.peek().kind {
            TokenKind::Keyword(Keyword::AllocSpace) => {
                AssignValue::Allocation(self.parse_allocation()?)
            }
            TokenKind::Keyword(Keyword::Line) => AssignValue::Line(self.parse_line()?),
            _ => AssignValue::Expr(self.parse_expr()?),
        };
        self.consume(TokenKind::Semicolon, "`;` after assignment")?;
        Ok(InstructionKind::Assign {
            name: name.lexeme,
            value,
        })
    }

    fn parse_allocation(&mut self) -> ParseResult<Allocation> {
        let keyword = self.consume_keyword(Keyword::AllocSpace)?;
        self.consume(TokenKind::LParen, "`(` after `allocSpace`")?;
        let name = self.consume(TokenKind::Identifier, "variable name in `allocSpace`")?;
        let close = self.consume(TokenKind::RParen, "`)` to close `allocSpace`")?;
        Ok(Allocation {
            name: name.lexeme,
            span: keyword.span.to(close.span),
        })
    }

    fn parse_line(&mut self) -> ParseResult<LineInstruction> {
        let keyword = self.consume_keyword(Keyword::Line)?;
        self.consume(TokenKind::LParen, "`(` after `LINE`")?;
        let start = self.parse_coordinate()?;
        self.consume(TokenKind::Comma, "`,` after start point")?;
        let vector = self.parse_coordinate()?;
        self.consume(TokenKind::Comma, "`,` after direction vector")?;
        let range_start = self.parse_number()?;
        self.consume(TokenKind::Comma, "`,` after range start")?;
        let range_end = self.parse_number()?;
        self.consume(TokenKind::Comma, "`,` after range end")?;
        let range_step = self.parse_number()?;
        let close = self.consume(TokenKind::RParen, "`)` to close `LINE`")?;
        Ok(LineInstruction {
            start,
            vector,
            range_start,
            range_end,
            range_step,
            span: keyword.span.to(close.span),
        })
    }

    fn parse_builtin_call(&mut self) -> ParseResult<BuiltinCall> {
        let keyword = self.consume_keyword(Keyword::DrawPixel)?;
        self.consume(TokenKind::LParen, "`(` after `drawPixel`")?;
        let at = self.parse_coordinate()?;
        let close = self.consume(TokenKind::RParen, "`)` to close `drawPixel`")?;
        Ok(BuiltinCall::DrawPixel {
            at,
            span: keyword.span.to(close.span),
        })
    }

    fn parse_coordinate(&mut self) -> ParseResult<CoordinateExpr> {
        let open = self.consume(TokenKind::LBracket, "`[` to start a coordinate")?;
        let x = self.parse_expr()?;
        self.consume(TokenKind::Colon, "`:` between coordinate components")?;
        let y = self.parse_expr()?;
        self.consume(TokenKind::Colon, "`:` between coordinate components")?;
        let z = self.parse_expr()?;
        let close = self.consume(TokenKind::RBracket, "`]` to close the coordinate")?;
        Ok(CoordinateExpr {
            x,
            y,
            z,
            span: open.span.to(close.span),
        })
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::Int | TokenKind::Float => {
                let literal = self.parse_number()?;
                Ok(Expr {
                    span: literal.token.span,
                    kind: ExprKind::Number(literal),
                })
            }
            TokenKind::Identifier => {
                let name = self.advance();
                Ok(Expr {
                    span: name.span,
                    kind: ExprKind::Variable(name.lexeme),
                })
            }
            TokenKind::LParen => {
                let open = self.advance();
                let inner = self.parse_expr()?;
                let close = self.consume(TokenKind::RParen, "`)` to close the group")?;
                Ok(Expr {
                    span: open.span.to(close.span),
                    kind: inner.kind,
                })
            }
            _ => Err(self.error("number, identifier or `(`")),
        }
    }

    fn parse_number(&mut self) -> ParseResult<NumberLiteral> {
        let value = match self.peek().kind {
            TokenKind::Int => match self.peek().lexeme.parse::<i64>() {
                Ok(n) => Number::Int(n),
                Err(_) => return Err(self.error("integer literal within 64-bit range")),
            },
            TokenKind::Float => match self.peek().lexeme.parse::<f64>() {
                Ok(f) => Number::Float(f),
                Err(_) => return Err(self.error("well-formed float literal")),
            },
            _ => return Err(self.error("number")),
        };
        let token = self.advance();
        Ok(NumberLiteral { token, value })
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> ParseResult<Token> {
        if self.check(TokenKind::Keyword(keyword)) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("keyword `{}`", keyword.as_str())))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.current + 1).min(self.tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error(&self, expected: &str) -> SyntaxError {
        let token = self.peek();
        SyntaxError {
            span: token.span,
            expected: expected.to_string(),
            found: token.describe(),
        }
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr {
        span: left.span.to(right.span),
        kind: ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
    }
}
