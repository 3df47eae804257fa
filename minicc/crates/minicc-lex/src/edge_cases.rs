//! Edge case tests for minicc-lex


#[cfg(test)]
mod roundtrip {
    use crate::{tokenize, TokenKind};
    use proptest::prelude::*;

    /// Operator, bracket, and punctuation spellings with fixed text.
    fn fixed_spelling() -> impl Strategy<Value = (TokenKind, String)> {
        use TokenKind::*;
        let spellings: Vec<(TokenKind, &str)> = vec![
            (AndAnd, "&&"),
            (OrOr, "||"),
            (PlusPlus, "++"),
            (MinusMinus, "--"),
            (EqEq, "=="),
            (Ne, "!="),
            (Le, "<="),
            (Ge, ">="),
            (Plus, "+"),
            (Minus, "-"),
            (Star, "*"),
            (Slash, "/"),
            (Percent, "%"),
            (Assign, "="),
            (Not, "!"),
            (Lt, "<"),
            (Gt, ">"),
            (LParen, "("),
            (RParen, ")"),
            (LBrack, "["),
            (RBrack, "]"),
            (LBrace, "{"),
            (RBrace, "}"),
            (Comma, ","),
            (Semicolon, ";"),
        ];
        prop::sample::select(spellings).prop_map(|(kind, s)| (kind, s.to_string()))
    }

    /// Spellings whose token reproduces the source exactly, for the
    /// lex/re-serialise round-trip property.
    fn spelling() -> impl Strategy<Value = (TokenKind, String)> {
        use TokenKind::*;
        prop_oneof![
            "[a-w_][a-zA-Z0-9_]{0,8}".prop_map(|s| {
                match TokenKind::keyword(&s) {
                    Some(kind) => (kind, s),
                    None => (Ident, s),
                }
            }),
            "0|[1-9][0-9]{0,6}".prop_map(|s| (Dec, s)),
            "0x[0-9a-fA-F]{1,6}".prop_map(|s| (Hex, s)),
            "0[0-7]{1,6}".prop_map(|s| (Oct, s)),
            fixed_spelling(),
        ]
    }

    proptest! {
        #[test]
        fn relexing_serialised_tokens_is_identity(items in prop::collection::vec(spelling(), 0..64)) {
            let source: String = items
                .iter()
                .map(|(_, s)| s.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let tokens = tokenize(&source);
            prop_assert_eq!(tokens.len(), items.len());
            for (token, (kind, spelling)) in tokens.iter().zip(items.iter()) {
                prop_assert_eq!(token.kind, *kind);
                prop_assert_eq!(&token.lexeme, spelling);
            }
        }
    }
}
