//! Edge case tests for minicc-par

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse;
    use minicc_lex::tokenize;

    fn parse_src(source: &str) -> Result<Program, crate::SyntaxError> {
        parse(tokenize(source))
    }

    #[test]
    fn test_edge_empty_translation_unit() {
        assert!(parse_src("").unwrap().is_empty());
    }

    #[test]
    fn test_edge_declaration_then_definition() {
        let program = parse_src("int f(int x);\nint f(int x){return x;}").unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_edge_empty_function_body() {
        let program = parse_src("void f(){}").unwrap();
        match &program[0] {
            Item::Func(f) => assert!(f.body.as_ref().unwrap().stmts.is_empty()),
            other => panic!("expected func, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_parameterless_function() {
        let program = parse_src("int main(){return 0;}").unwrap();
        match &program[0] {
            Item::Func(f) => assert!(f.params.is_empty()),
            other => panic!("expected func, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_deeply_nested_parens() {
        assert!(parse_src("int f(){return ((((1))));}").is_ok());
    }

    #[test]
    fn test_edge_missing_semicolon() {
        let err = parse_src("int a").unwrap_err();
        assert!(err.message.contains("Expected"));
    }

    #[test]
    fn test_edge_unbalanced_brace() {
        assert!(parse_src("int f(){").is_err());
    }

    #[test]
    fn test_edge_array_extent_must_be_constant() {
        // Only literal extents are grammatical in a declaration.
        assert!(parse_src("int f(int n){int a[n]; return 0;}").is_err());
    }

    #[test]
    fn test_edge_open_extent_only_in_params() {
        assert!(parse_src("int f(){int a[]; return 0;}").is_err());
    }

    #[test]
    fn test_edge_multidim_array_global() {
        let program = parse_src("int g[2][3][4];").unwrap();
        match &program[0] {
            Item::Array(a) => assert_eq!(a.extents, vec![Some(2), Some(3), Some(4)]),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_prefix_address_of_is_rejected() {
        // `&`/`*` are not prefix operators in this dialect.
        assert!(parse_src("int f(int x){return &x;}").is_err());
        assert!(parse_src("int f(int x){return *x;}").is_err());
    }

    #[test]
    fn test_edge_ast_serializes() {
        let program = parse_src("int a; int main(){return a;}").unwrap();
        let json = serde_json::to_string(&serde_json::json!({ "root": program })).unwrap();
        assert!(json.contains("\"Func\""));
    }

    #[test]
    fn test_edge_line_numbers_survive_comments() {
        let program = parse_src("// header\nint a;\n/* b */\nint b;").unwrap();
        match (&program[0], &program[1]) {
            (Item::Var(a), Item::Var(b)) => {
                assert_eq!(a.line, 2);
                assert_eq!(b.line, 4);
            }
            other => panic!("expected vars, got {other:?}"),
        }
    }
}
