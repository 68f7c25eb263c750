//! Token stream -> AST.
//!
//! Recursive descent with explicit precedence climbing for expressions, following spec.md §4.2.
//! Every `parse_*` function consumes exactly the tokens belonging to the construct it names and
//! leaves the cursor on the first token it didn't consume, the same contract the teacher's
//! `FromTokens::parse` functions use.

pub mod ast;

use crate::error::{CompileError, CompileResult};
use crate::lexer::{Lexer, Token, TokenKind};

use ast::{Binding, BinOp, Cmd, Expr, LValue, Program, Stmt, Type, UnOp};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
        }
    }

    fn unexpected(tok: &Token) -> CompileError {
        if tok.is(TokenKind::Eof) {
            CompileError::new("Unexpected end of file", tok.offset)
        } else {
            CompileError::new(format!("Unexpected token: '{}'", tok.lexeme), tok.offset)
        }
    }

    fn peek(&mut self) -> CompileResult<Token> {
        self.lexer.peek()
    }

    fn next(&mut self) -> CompileResult<Token> {
        self.lexer.next()
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        let tok = self.next()?;
        if tok.kind != kind {
            return Err(Self::unexpected(&tok));
        }
        Ok(tok)
    }

    fn expect_op(&mut self, op: &str) -> CompileResult<Token> {
        let tok = self.next()?;
        if tok.kind != TokenKind::Op || tok.lexeme != op {
            return Err(Self::unexpected(&tok));
        }
        Ok(tok)
    }

    fn at(&mut self, kind: TokenKind) -> CompileResult<bool> {
        Ok(self.peek()?.kind == kind)
    }

    fn at_op(&mut self, op: &str) -> CompileResult<bool> {
        let tok = self.peek()?;
        Ok(tok.kind == TokenKind::Op && tok.lexeme == op)
    }

    fn skip_blank_lines(&mut self) -> CompileResult<()> {
        while self.at(TokenKind::NewLine)? {
            self.next()?;
        }
        Ok(())
    }

    // ---- Program -----------------------------------------------------

    pub fn parse_program(&mut self) -> CompileResult<Program> {
        let mut cmds = Vec::new();
        self.skip_blank_lines()?;
        while !self.at(TokenKind::Eof)? {
            cmds.push(self.parse_cmd()?);
            if !self.at(TokenKind::Eof)? {
                self.expect(TokenKind::NewLine)?;
            }
            self.skip_blank_lines()?;
        }
        Ok(Program::new(cmds))
    }

    // ---- Types ---------------------------------------------------------

    fn parse_type(&mut self) -> CompileResult<Type> {
        let tok = self.next()?;
        let mut base = match tok.kind {
            TokenKind::Int => Type::Int,
            TokenKind::Bool => Type::Bool,
            TokenKind::Float => Type::Float,
            TokenKind::Void => Type::Void,
            TokenKind::Variable => Type::Struct(tok.lexeme.clone()),
            _ => return Err(Self::unexpected(&tok)),
        };
        while self.at(TokenKind::LSquare)? {
            self.next()?;
            let mut rank = 1usize;
            while self.at(TokenKind::Comma)? {
                self.next()?;
                rank += 1;
            }
            self.expect(TokenKind::RSquare)?;
            base = Type::Array {
                element: Box::new(base),
                rank,
            };
        }
        Ok(base)
    }

    // ---- LValues ---------------------------------------------------------

    fn parse_lvalue(&mut self) -> CompileResult<LValue> {
        let tok = self.expect(TokenKind::Variable)?;
        let offset = tok.offset;
        let name = tok.lexeme;
        if self.at(TokenKind::LSquare)? {
            self.next()?;
            let mut indices = Vec::new();
            loop {
                let idx = self.expect(TokenKind::Variable)?;
                indices.push(idx.lexeme);
                if self.at(TokenKind::Comma)? {
                    self.next()?;
                    continue;
                }
                break;
            }
            self.expect(TokenKind::RSquare)?;
            Ok(LValue::Array {
                name,
                indices,
                offset,
            })
        } else {
            Ok(LValue::Var { name, offset })
        }
    }

    fn parse_binding(&mut self) -> CompileResult<Binding> {
        let lvalue = self.parse_lvalue()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Binding { lvalue, ty })
    }

    // ---- Commands -----------------------------------------------------

    fn parse_cmd(&mut self) -> CompileResult<Cmd> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Read => self.parse_read_cmd(),
            TokenKind::Write => self.parse_write_cmd(),
            TokenKind::Let => self.parse_let_cmd(),
            TokenKind::Assert => self.parse_assert_cmd(),
            TokenKind::Print => self.parse_print_cmd(),
            TokenKind::Show => self.parse_show_cmd(),
            TokenKind::Time => self.parse_time_cmd(),
            TokenKind::Fn => self.parse_fn_cmd(),
            TokenKind::Struct => self.parse_struct_cmd(),
            _ => Err(Self::unexpected(&tok)),
        }
    }

    fn parse_read_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Read)?.offset;
        self.expect(TokenKind::Image)?;
        let file = self.expect(TokenKind::String)?.lexeme;
        self.expect(TokenKind::To)?;
        let lvalue = self.parse_lvalue()?;
        Ok(Cmd::Read {
            file,
            lvalue,
            offset,
        })
    }

    fn parse_write_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Write)?.offset;
        self.expect(TokenKind::Image)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::To)?;
        let file = self.expect(TokenKind::String)?.lexeme;
        Ok(Cmd::Write {
            expr,
            file,
            offset,
        })
    }

    fn parse_let_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Let)?.offset;
        let lvalue = self.parse_lvalue()?;
        self.expect(TokenKind::Equals)?;
        let expr = self.parse_expr()?;
        Ok(Cmd::Let {
            lvalue,
            expr,
            offset,
        })
    }

    fn parse_assert_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Assert)?.offset;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let message = self.expect(TokenKind::String)?.lexeme;
        Ok(Cmd::Assert {
            expr,
            message,
            offset,
        })
    }

    fn parse_print_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Print)?.offset;
        let message = self.expect(TokenKind::String)?.lexeme;
        Ok(Cmd::Print { message, offset })
    }

    fn parse_show_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Show)?.offset;
        let expr = self.parse_expr()?;
        Ok(Cmd::Show { expr, offset })
    }

    fn parse_time_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Time)?.offset;
        let cmd = self.parse_cmd()?;
        Ok(Cmd::Time {
            cmd: Box::new(cmd),
            offset,
        })
    }

    fn parse_fn_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Fn)?.offset;
        let name = self.expect(TokenKind::Variable)?.lexeme;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen)? {
            loop {
                params.push(self.parse_binding()?);
                if self.at(TokenKind::Comma)? {
                    self.next()?;
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;
        let ret = self.parse_type()?;
        self.expect(TokenKind::LCurly)?;
        self.expect(TokenKind::NewLine)?;
        let mut body = Vec::new();
        self.skip_blank_lines()?;
        while !self.at(TokenKind::RCurly)? {
            body.push(self.parse_stmt()?);
            self.expect(TokenKind::NewLine)?;
            self.skip_blank_lines()?;
        }
        self.expect(TokenKind::RCurly)?;
        Ok(Cmd::Fn {
            name,
            params,
            ret,
            body,
            offset,
        })
    }

    fn parse_struct_cmd(&mut self) -> CompileResult<Cmd> {
        let offset = self.expect(TokenKind::Struct)?.offset;
        let name = self.expect(TokenKind::Variable)?.lexeme;
        self.expect(TokenKind::LCurly)?;
        self.expect(TokenKind::NewLine)?;
        let mut fields = Vec::new();
        self.skip_blank_lines()?;
        while !self.at(TokenKind::RCurly)? {
            let field_name = self.expect(TokenKind::Variable)?.lexeme;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push((field_name, ty));
            self.expect(TokenKind::NewLine)?;
            self.skip_blank_lines()?;
        }
        self.expect(TokenKind::RCurly)?;
        Ok(Cmd::Struct {
            name,
            fields,
            offset,
        })
    }

    // ---- Statements -----------------------------------------------------

    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Let => {
                self.next()?;
                let lvalue = self.parse_lvalue()?;
                self.expect(TokenKind::Equals)?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Let {
                    lvalue,
                    expr,
                    offset: tok.offset,
                })
            }
            TokenKind::Assert => {
                self.next()?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Comma)?;
                let message = self.expect(TokenKind::String)?.lexeme;
                Ok(Stmt::Assert {
                    expr,
                    message,
                    offset: tok.offset,
                })
            }
            TokenKind::Return => {
                self.next()?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Return {
                    expr,
                    offset: tok.offset,
                })
            }
            _ => Err(Self::unexpected(&tok)),
        }
    }

    // ---- Expressions -----------------------------------------------------
    //
    // Precedence, lowest to highest: `|| &&`; comparisons; additive; multiplicative; unary
    // prefix; postfix; atoms.

    pub fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_logical_expr()
    }

    fn parse_logical_expr(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_compare_expr()?;
        loop {
            let tok = self.peek()?;
            let op = if tok.kind == TokenKind::Op && (tok.lexeme == "&&" || tok.lexeme == "||") {
                BinOp::from_lexeme(&tok.lexeme).unwrap()
            } else {
                break;
            };
            self.next()?;
            let right = self.parse_compare_expr()?;
            let offset = left.offset();
            left = Expr::Binop {
                op,
                left: Box::new(left),
                right: Box::new(right),
                offset,
                info: (),
            };
        }
        Ok(left)
    }

    fn parse_compare_expr(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_additive_expr()?;
        loop {
            let tok = self.peek()?;
            let is_cmp = tok.kind == TokenKind::Op
                && matches!(tok.lexeme.as_str(), "<" | ">" | "<=" | ">=" | "==" | "!=");
            if !is_cmp {
                break;
            }
            let op = BinOp::from_lexeme(&tok.lexeme).unwrap();
            self.next()?;
            let right = self.parse_additive_expr()?;
            let offset = left.offset();
            left = Expr::Binop {
                op,
                left: Box::new(left),
                right: Box::new(right),
                offset,
                info: (),
            };
        }
        Ok(left)
    }

    fn parse_additive_expr(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_mult_expr()?;
        loop {
            let tok = self.peek()?;
            let is_add = tok.kind == TokenKind::Op && matches!(tok.lexeme.as_str(), "+" | "-");
            if !is_add {
                break;
            }
            let op = BinOp::from_lexeme(&tok.lexeme).unwrap();
            self.next()?;
            let right = self.parse_mult_expr()?;
            let offset = left.offset();
            left = Expr::Binop {
                op,
                left: Box::new(left),
                right: Box::new(right),
                offset,
                info: (),
            };
        }
        Ok(left)
    }

    fn parse_mult_expr(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_unary_expr()?;
        loop {
            let tok = self.peek()?;
            let is_mul = tok.kind == TokenKind::Op && matches!(tok.lexeme.as_str(), "*" | "/" | "%");
            if !is_mul {
                break;
            }
            let op = BinOp::from_lexeme(&tok.lexeme).unwrap();
            self.next()?;
            let right = self.parse_unary_expr()?;
            let offset = left.offset();
            left = Expr::Binop {
                op,
                left: Box::new(left),
                right: Box::new(right),
                offset,
                info: (),
            };
        }
        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> CompileResult<Expr> {
        let tok = self.peek()?;
        if tok.kind == TokenKind::Op && (tok.lexeme == "-" || tok.lexeme == "!") {
            self.next()?;
            let op = if tok.lexeme == "-" { UnOp::Neg } else { UnOp::Not };
            let inner = self.parse_unary_expr()?;
            return Ok(Expr::Unop {
                op,
                expr: Box::new(inner),
                offset: tok.offset,
                info: (),
            });
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> CompileResult<Expr> {
        let mut base = self.parse_atom()?;
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Dot => {
                    self.next()?;
                    let field = self.expect(TokenKind::Variable)?.lexeme;
                    let offset = base.offset();
                    base = Expr::Dot {
                        base: Box::new(base),
                        field,
                        offset,
                        info: (),
                    };
                }
                TokenKind::LSquare => {
                    self.next()?;
                    let mut indices = Vec::new();
                    loop {
                        indices.push(self.parse_expr()?);
                        if self.at(TokenKind::Comma)? {
                            self.next()?;
                            continue;
                        }
                        break;
                    }
                    self.expect(TokenKind::RSquare)?;
                    let offset = base.offset();
                    base = Expr::ArrayIndex {
                        base: Box::new(base),
                        indices,
                        offset,
                        info: (),
                    };
                }
                _ => break,
            }
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> CompileResult<Expr> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::IntVal => {
                let value = tok.lexeme.parse::<i64>().map_err(|_| {
                    CompileError::new(
                        format!("Integer literal out of range: '{}'", tok.lexeme),
                        tok.offset,
                    )
                })?;
                Ok(Expr::Int {
                    value,
                    offset: tok.offset,
                    info: (),
                })
            }
            TokenKind::FloatVal => {
                let value = tok.lexeme.parse::<f64>().map_err(|_| {
                    CompileError::new(
                        format!("Float literal out of range: '{}'", tok.lexeme),
                        tok.offset,
                    )
                })?;
                Ok(Expr::Float {
                    value,
                    offset: tok.offset,
                    info: (),
                })
            }
            TokenKind::True => Ok(Expr::True {
                offset: tok.offset,
                info: (),
            }),
            TokenKind::False => Ok(Expr::False {
                offset: tok.offset,
                info: (),
            }),
            TokenKind::LParen => {
                if self.at(TokenKind::RParen)? {
                    self.next()?;
                    return Ok(Expr::Void {
                        offset: tok.offset,
                        info: (),
                    });
                }
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LSquare => self.parse_array_literal(tok.offset),
            TokenKind::If => self.parse_if_expr(tok.offset),
            TokenKind::Array => self.parse_array_loop(tok.offset),
            TokenKind::Sum => self.parse_sum_loop(tok.offset),
            TokenKind::Variable => self.parse_var_or_call_or_struct(tok),
            _ => Err(Self::unexpected(&tok)),
        }
    }

    fn parse_array_literal(&mut self, offset: usize) -> CompileResult<Expr> {
        let mut elements = Vec::new();
        if !self.at(TokenKind::RSquare)? {
            loop {
                elements.push(self.parse_expr()?);
                if self.at(TokenKind::Comma)? {
                    self.next()?;
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RSquare)?;
        Ok(Expr::ArrayLiteral {
            elements,
            offset,
            info: (),
        })
    }

    fn parse_if_expr(&mut self, offset: usize) -> CompileResult<Expr> {
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_expr()?;
        self.expect(TokenKind::Else)?;
        let else_branch = self.parse_expr()?;
        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            offset,
            info: (),
        })
    }

    fn parse_axes(&mut self) -> CompileResult<Vec<(String, Expr)>> {
        self.expect(TokenKind::LSquare)?;
        let mut axes = Vec::new();
        loop {
            let name = self.expect(TokenKind::Variable)?.lexeme;
            self.expect(TokenKind::Colon)?;
            let bound = self.parse_expr()?;
            axes.push((name, bound));
            if self.at(TokenKind::Comma)? {
                self.next()?;
                continue;
            }
            break;
        }
        self.expect(TokenKind::RSquare)?;
        if axes.is_empty() {
            let tok = self.peek()?;
            return Err(CompileError::new("loop must have at least one axis", tok.offset));
        }
        Ok(axes)
    }

    fn parse_array_loop(&mut self, offset: usize) -> CompileResult<Expr> {
        let axes = self.parse_axes()?;
        let body = self.parse_expr()?;
        Ok(Expr::ArrayLoop {
            axes,
            body: Box::new(body),
            offset,
            info: (),
        })
    }

    fn parse_sum_loop(&mut self, offset: usize) -> CompileResult<Expr> {
        let axes = self.parse_axes()?;
        let body = self.parse_expr()?;
        Ok(Expr::SumLoop {
            axes,
            body: Box::new(body),
            offset,
            info: (),
        })
    }

    fn parse_var_or_call_or_struct(&mut self, tok: Token) -> CompileResult<Expr> {
        let name = tok.lexeme;
        let offset = tok.offset;
        if self.at(TokenKind::LParen)? {
            self.next()?;
            let mut args = Vec::new();
            if !self.at(TokenKind::RParen)? {
                loop {
                    args.push(self.parse_expr()?);
                    if self.at(TokenKind::Comma)? {
                        self.next()?;
                        continue;
                    }
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            return Ok(Expr::Call {
                name,
                args,
                offset,
                info: (),
            });
        }
        if self.at(TokenKind::LCurly)? {
            self.next()?;
            let mut fields = Vec::new();
            if !self.at(TokenKind::RCurly)? {
                loop {
                    fields.push(self.parse_expr()?);
                    if self.at(TokenKind::Comma)? {
                        self.next()?;
                        continue;
                    }
                    break;
                }
            }
            self.expect(TokenKind::RCurly)?;
            return Ok(Expr::StructLiteral {
                name,
                fields,
                offset,
                info: (),
            });
        }
        Ok(Expr::Var {
            name,
            offset,
            info: (),
        })
    }
}

/// Parse an entire source string into a `Program` (used by the `-p` stop-point and tests).
pub fn parse_program(src: &str) -> CompileResult<Program> {
    Parser::new(src).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_binop() {
        let program = parse_program("show 3+4\n").unwrap();
        assert_eq!(program.cmds.len(), 1);
        match &program.cmds[0] {
            Cmd::Show { expr, .. } => match expr {
                Expr::Binop { op, left, right, .. } => {
                    assert_eq!(*op, BinOp::Add);
                    assert!(matches!(**left, Expr::Int { value: 3, .. }));
                    assert!(matches!(**right, Expr::Int { value: 4, .. }));
                }
                _ => panic!("expected binop"),
            },
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn chained_comparisons_are_left_leaning() {
        let program = parse_program("show a<b<c\n").unwrap();
        match &program.cmds[0] {
            Cmd::Show { expr, .. } => match expr {
                Expr::Binop { op: BinOp::Lt, left, .. } => {
                    assert!(matches!(**left, Expr::Binop { op: BinOp::Lt, .. }));
                }
                _ => panic!("expected outer <"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn unary_binds_looser_than_postfix() {
        let program = parse_program("show -a.x\n").unwrap();
        match &program.cmds[0] {
            Cmd::Show { expr, .. } => {
                let Expr::Unop { expr: inner, .. } = expr else {
                    panic!("expected unop")
                };
                assert!(matches!(**inner, Expr::Dot { .. }));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_array_loop_and_sum_loop() {
        let program = parse_program("let x = array[i : 3, j : 2] i*10+j\n").unwrap();
        assert!(matches!(
            &program.cmds[0],
            Cmd::Let {
                expr: Expr::ArrayLoop { .. },
                ..
            }
        ));

        let program = parse_program("let s = sum[i : 5] i\n").unwrap();
        assert!(matches!(
            &program.cmds[0],
            Cmd::Let {
                expr: Expr::SumLoop { .. },
                ..
            }
        ));
    }

    #[test]
    fn parses_struct_and_fn_cmds() {
        let src = "struct rgba2 {\n  x : float\n  y : float\n}\nfn f(a : int, b : float) : float {\n  return b + to_float(a)\n}\n";
        let program = parse_program(src).unwrap();
        assert!(matches!(program.cmds[0], Cmd::Struct { .. }));
        assert!(matches!(program.cmds[1], Cmd::Fn { .. }));
    }

    #[test]
    fn rejects_unexpected_token() {
        let err = parse_program("let = 3\n").unwrap_err();
        assert!(err.message.contains("Unexpected token"));
    }
}
