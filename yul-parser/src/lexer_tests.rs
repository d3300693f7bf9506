#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::lexer::{unescape, Lexer, Token};

    fn tokens(source: &str) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    #[test]
    fn test_delimiters_and_operators() {
        assert_eq!(
            tokens("{ } ( ) , : := ->"),
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LParen,
                Token::RParen,
                Token::Comma,
                Token::Colon,
                Token::Assign,
                Token::Arrow,
            ]
        );
    }

    #[test]
    fn test_keywords_versus_identifiers() {
        assert_eq!(
            tokens("function functions let letter leave default_1 true"),
            vec![
                Token::Function,
                Token::Identifier("functions"),
                Token::Let,
                Token::Identifier("letter"),
                Token::Leave,
                Token::Identifier("default_1"),
                Token::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_identifier_charset() {
        assert_eq!(
            tokens("$x a.b.c _0"),
            vec![
                Token::Identifier("$x"),
                Token::Identifier("a.b.c"),
                Token::Identifier("_0"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("0 42 0x2a 0XFF"),
            vec![
                Token::Number("0"),
                Token::Number("42"),
                Token::Number("0x2a"),
                Token::Number("0"),
                Token::Identifier("XFF"),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokens(r#""abc" 'x' "a\"b" "\x41\n""#),
            vec![
                Token::String("abc".to_string()),
                Token::String("x".to_string()),
                Token::String("a\"b".to_string()),
                Token::String("A\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(
            tokens(r#"hex"00ff" hex''"#),
            vec![Token::HexString(vec![0, 255]), Token::HexString(vec![])]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokens("a // line\n /* block\n * more */ b"),
            vec![Token::Identifier("a"), Token::Identifier("b")]
        );
    }

    #[test]
    fn test_block_comment_forms() {
        for source in ["a /* x */ b", "a /** doc */ b", "a /***/ b", "a /* x\n * y **/ b", "a/**/b"] {
            assert_eq!(
                tokens(source),
                vec![Token::Identifier("a"), Token::Identifier("b")],
                "{:?}",
                source
            );
        }
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lexer = Lexer::new("a /* b");
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Identifier("a")));
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_invalid_token() {
        let mut lexer = Lexer::new("a # b");
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Identifier("a")));
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("let x");
        assert_eq!(lexer.peek_token().unwrap(), Some(&Token::Let));
        assert_eq!(lexer.position(), 0);
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Let));
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Identifier("x")));
        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"\u00e9").unwrap(), "\u{c3}\u{a9}");
        assert_eq!(unescape("é").unwrap(), "\u{c3}\u{a9}");
        assert!(unescape(r"\q").is_none());
        assert!(unescape(r"\x4").is_none());
    }
}
