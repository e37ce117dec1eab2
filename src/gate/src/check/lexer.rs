use super::CheckError;

/// A token of the check expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    EqEq,
    NotEq,
    Gte,
    Lte,
    Gt,
    Lt,
    AndAnd,
    OrOr,
    Bang,
}

/// Tokenize an expression source, pairing each token with its byte offset.
pub fn lex(source: &str) -> Result<Vec<(Token, usize)>, CheckError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push((Token::EqEq, i));
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push((Token::NotEq, i));
                i += 2;
            }
            '!' => {
                tokens.push((Token::Bang, i));
                i += 1;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push((Token::Gte, i));
                i += 2;
            }
            '>' => {
                tokens.push((Token::Gt, i));
                i += 1;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push((Token::Lte, i));
                i += 2;
            }
            '<' => {
                tokens.push((Token::Lt, i));
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push((Token::AndAnd, i));
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push((Token::OrOr, i));
                i += 2;
            }
            '"' => {
                let (token, next) = lex_string(&chars, i)?;
                tokens.push((token, i));
                i = next;
            }
            '-' if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                let (token, next) = lex_int(&chars, i)?;
                tokens.push((token, i));
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (token, next) = lex_int(&chars, i)?;
                tokens.push((token, i));
                i = next;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push((Token::Ident(ident), start));
            }
            other => return Err(CheckError::UnexpectedChar { ch: other, pos: i }),
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Result<(Token, usize), CheckError> {
    let mut value = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((Token::Str(value), i + 1)),
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or(CheckError::UnterminatedString { pos: start })?;
                match escaped {
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    other => {
                        return Err(CheckError::UnexpectedChar {
                            ch: *other,
                            pos: i + 1,
                        })
                    }
                }
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    Err(CheckError::UnterminatedString { pos: start })
}

fn lex_int(chars: &[char], start: usize) -> Result<(Token, usize), CheckError> {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<i64>()
        .map_err(|_| CheckError::IntOutOfRange { pos: start })?;
    Ok((Token::Int(value), i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lexes_comparison_expression() {
        assert_eq!(
            tokens(r#"content() == "bar""#),
            vec![
                Token::Ident("content".to_string()),
                Token::LParen,
                Token::RParen,
                Token::EqEq,
                Token::Str("bar".to_string()),
            ]
        );
    }

    #[test]
    fn lexes_all_operators() {
        assert_eq!(
            tokens("== != >= <= > < && || !"),
            vec![
                Token::EqEq,
                Token::NotEq,
                Token::Gte,
                Token::Lte,
                Token::Gt,
                Token::Lt,
                Token::AndAnd,
                Token::OrOr,
                Token::Bang,
            ]
        );
    }

    #[test]
    fn lexes_negative_int() {
        assert_eq!(tokens("-42"), vec![Token::Int(-42)]);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\n""#),
            vec![Token::Str("a\"b\n".to_string())]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        assert_eq!(
            lex(r#""abc"#).unwrap_err(),
            CheckError::UnterminatedString { pos: 0 }
        );
    }

    #[test]
    fn unexpected_char_errors() {
        assert_eq!(lex("#").unwrap_err(), CheckError::UnexpectedChar { ch: '#', pos: 0 });
    }

    #[test]
    fn int_out_of_range_errors() {
        assert!(matches!(
            lex("99999999999999999999").unwrap_err(),
            CheckError::IntOutOfRange { .. }
        ));
    }
}
