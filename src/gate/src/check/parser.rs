use super::expr::{BinaryOp, Expr};
use super::lexer::{lex, Token};
use super::registry::CheckFuncRegistry;
use super::value::Value;
use super::CheckError;

/// Parse an expression source into a compiled tree, resolving function
/// calls against the registry.
///
/// Grammar (highest binding first):
///
/// ```text
/// primary := INT | STRING | IDENT '(' ')' | '(' expr ')'
/// unary   := '!' unary | primary
/// cmp     := unary ( ('=='|'!='|'>='|'<='|'>'|'<') unary )?
/// and     := cmp ( '&&' cmp )*
/// expr    := and ( '||' and )*
/// ```
pub fn parse(source: &str, registry: &CheckFuncRegistry) -> Result<Expr, CheckError> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        registry,
    };
    let expr = parser.parse_or()?;
    if let Some((token, pos)) = parser.peek_with_pos() {
        return Err(CheckError::UnexpectedToken {
            found: describe(token),
            expected: "end of expression".to_string(),
            pos,
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    registry: &'a CheckFuncRegistry,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_with_pos(&self) -> Option<(&Token, usize)> {
        self.tokens.get(self.pos).map(|(t, p)| (t, *p))
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn expect(&mut self, want: &Token, expected: &str) -> Result<(), CheckError> {
        match self.advance() {
            Some((token, _)) if token == *want => Ok(()),
            Some((token, pos)) => Err(CheckError::UnexpectedToken {
                found: describe(&token),
                expected: expected.to_string(),
                pos,
            }),
            None => Err(CheckError::UnexpectedEof),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, CheckError> {
        let mut expr = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            expr = Expr::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, CheckError> {
        let mut expr = self.parse_cmp()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            let rhs = self.parse_cmp()?;
            expr = Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn parse_cmp(&mut self) -> Result<Expr, CheckError> {
        let lhs = self.parse_unary()?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::NotEq) => BinaryOp::NotEq,
            Some(Token::Gte) => BinaryOp::Gte,
            Some(Token::Lte) => BinaryOp::Lte,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Lt) => BinaryOp::Lt,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_unary()?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, CheckError> {
        if self.peek() == Some(&Token::Bang) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, CheckError> {
        match self.advance() {
            Some((Token::Int(value), _)) => Ok(Expr::Literal(Value::Int(value))),
            Some((Token::Str(value), _)) => Ok(Expr::Literal(Value::Str(value))),
            Some((Token::Ident(name), _)) => {
                self.expect(&Token::LParen, "`(`")?;
                self.expect(&Token::RParen, "`)`")?;
                let func = self
                    .registry
                    .get(&name)
                    .ok_or(CheckError::UnknownFunction { name })?;
                Ok(Expr::Call(func))
            }
            Some((Token::LParen, _)) => {
                let expr = self.parse_or()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(expr)
            }
            Some((token, pos)) => Err(CheckError::UnexpectedToken {
                found: describe(&token),
                expected: "a literal, function call, or `(`".to_string(),
                pos,
            }),
            None => Err(CheckError::UnexpectedEof),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(v) => format!("integer `{v}`"),
        Token::Str(s) => format!("string {s:?}"),
        Token::Ident(name) => format!("identifier `{name}`"),
        Token::LParen => "`(`".to_string(),
        Token::RParen => "`)`".to_string(),
        Token::EqEq => "`==`".to_string(),
        Token::NotEq => "`!=`".to_string(),
        Token::Gte => "`>=`".to_string(),
        Token::Lte => "`<=`".to_string(),
        Token::Gt => "`>`".to_string(),
        Token::Lt => "`<`".to_string(),
        Token::AndAnd => "`&&`".to_string(),
        Token::OrOr => "`||`".to_string(),
        Token::Bang => "`!`".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckContext;
    use message::Part;

    fn eval(source: &str, parts: &[Part], index: usize) -> Result<Value, super::super::EvalError> {
        let registry = CheckFuncRegistry::with_builtins();
        let expr = parse(source, &registry).expect("parse");
        expr.eval(&CheckContext::new(parts, index))
    }

    #[test]
    fn content_equality() {
        let parts = vec![Part::new("foo"), Part::new("bar")];
        assert_eq!(
            eval(r#"content() == "bar""#, &parts, 1).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval(r#"content() == "bar""#, &parts, 0).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn batch_size_comparison() {
        let parts = vec![Part::new("a"), Part::new("b"), Part::new("c")];
        assert_eq!(eval("batch_size() >= 3", &parts, 2).unwrap(), Value::Bool(true));
        assert_eq!(eval("batch_size() > 3", &parts, 2).unwrap(), Value::Bool(false));
    }

    #[test]
    fn boolean_combinators_and_parens() {
        let parts = vec![Part::new("bar")];
        assert_eq!(
            eval(
                r#"(batch_size() >= 1 && content() == "bar") || batch_size() > 100"#,
                &parts,
                0
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval(r#"!(content() == "bar")"#, &parts, 0).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn precedence_binds_and_tighter_than_or() {
        let parts = vec![Part::new("x")];
        // false && false || true => (false && false) || true => true
        assert_eq!(
            eval("1 == 2 && 1 == 2 || 1 == 1", &parts, 0).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unknown_function_is_a_compile_error() {
        let registry = CheckFuncRegistry::with_builtins();
        let err = parse("nope() == 1", &registry).unwrap_err();
        assert_eq!(
            err,
            CheckError::UnknownFunction {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let registry = CheckFuncRegistry::with_builtins();
        assert!(matches!(
            parse("1 == 1 2", &registry).unwrap_err(),
            CheckError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn missing_call_parens_are_rejected() {
        let registry = CheckFuncRegistry::with_builtins();
        assert!(parse("content == 1", &registry).is_err());
    }

    #[test]
    fn empty_source_is_rejected() {
        let registry = CheckFuncRegistry::with_builtins();
        assert_eq!(parse("", &registry).unwrap_err(), CheckError::UnexpectedEof);
    }
}
