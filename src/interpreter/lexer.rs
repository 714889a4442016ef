//! Line tokenizer for program source.
//!
//! One instruction per line; `//` starts a comment; tokens are separated by
//! whitespace; double-quoted string literals keep their quotes for the
//! immediate parsers to interpret.

use crate::errors::RuntimeError;

/// One token with its 1-based column, for diagnostics.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Tokenizes a single source line.
///
/// Rules:
/// - `//` starts a comment (outside string literals)
/// - whitespace separates tokens
/// - double quotes delimit string literals, kept intact in the token
pub fn tokenize(line_no: usize, line: &str) -> Result<Vec<Token<'_>>, RuntimeError> {
    let mut out = Vec::with_capacity(4);

    let bytes = line.as_bytes();
    let mut start: Option<usize> = None;
    let mut in_str = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        // comment start
        if !in_str && b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            break;
        }

        match b {
            b'"' => {
                if start.is_none() {
                    start = Some(i);
                }
                in_str = !in_str;
                i += 1;
            }
            b' ' | b'\t' if !in_str => {
                if let Some(s) = start.take() {
                    out.push(Token {
                        text: &line[s..i],
                        offset: s + 1,
                    });
                }
                i += 1;
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
                i += 1;
            }
        }
    }

    if in_str {
        return Err(RuntimeError::InvalidOpArg {
            opcode: "byte".to_string(),
            arg: "unterminated string literal".to_string(),
        }
        .with_line(line_no));
    }

    if let Some(s) = start {
        out.push(Token {
            text: &line[s..i],
            offset: s + 1,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        tokenize(1, line)
            .unwrap()
            .into_iter()
            .map(|t| t.text.to_string())
            .collect()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(texts("int  42"), vec!["int", "42"]);
        assert_eq!(texts("\tgtxn 0 Amount "), vec!["gtxn", "0", "Amount"]);
    }

    #[test]
    fn empty_and_comment_lines() {
        assert!(texts("").is_empty());
        assert!(texts("   ").is_empty());
        assert!(texts("// only a comment").is_empty());
    }

    #[test]
    fn trailing_comment_is_stripped() {
        assert_eq!(texts("int 1 // push one"), vec!["int", "1"]);
    }

    #[test]
    fn string_literal_keeps_quotes_and_spaces() {
        assert_eq!(texts(r#"byte "hello world""#), vec!["byte", r#""hello world""#]);
    }

    #[test]
    fn slashes_inside_string_are_not_comments() {
        assert_eq!(texts(r#"byte "a//b""#), vec!["byte", r#""a//b""#]);
    }

    #[test]
    fn unterminated_string_fails() {
        let err = tokenize(3, r#"byte "oops"#).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(matches!(err.root(), RuntimeError::InvalidOpArg { .. }));
    }

    #[test]
    fn token_offsets_are_one_based() {
        let tokens = tokenize(1, "int 7").unwrap();
        assert_eq!(tokens[0].offset, 1);
        assert_eq!(tokens[1].offset, 5);
    }
}
