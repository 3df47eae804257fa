//! Edge case tests for minicc-sem

#[cfg(test)]
mod tests {
    use crate::sentence::*;
    use crate::{analyze, Analysis};
    use minicc_util::Handler;

    fn lower(source: &str) -> (Analysis, Handler) {
        let handler = Handler::new_quiet();
        let tokens = minicc_lex::tokenize(source);
        let program = minicc_par::parse(tokens).expect("test source should parse");
        let analysis = analyze(&program, &handler);
        (analysis, handler)
    }

    fn first_error(source: &str) -> String {
        let (_, handler) = lower(source);
        handler
            .diagnostics()
            .into_iter()
            .find(|d| d.level.is_error())
            .map(|d| d.message)
            .expect("expected a diagnostic")
    }

    #[test]
    fn test_edge_undefined_variable() {
        assert_eq!(first_error("int f(){return y;}"), "Undefined variable y");
    }

    #[test]
    fn test_edge_undefined_function() {
        assert_eq!(first_error("int f(){return g();}"), "Undefined function g");
    }

    #[test]
    fn test_edge_no_matching_overload() {
        assert_eq!(
            first_error("int h(int x){return x;} int f(){return h(1, 2);}"),
            "Can't find proper function call of h"
        );
    }

    #[test]
    fn test_edge_break_outside_loop() {
        assert_eq!(
            first_error("int f(){break; return 0;}"),
            "Can't find loop block to set 'break'"
        );
    }

    #[test]
    fn test_edge_continue_outside_loop() {
        assert_eq!(
            first_error("int f(){continue; return 0;}"),
            "Can't find loop block to set 'continue'"
        );
    }

    #[test]
    fn test_edge_return_value_in_void_function() {
        assert_eq!(
            first_error("void f(){return 1;}"),
            "Return type 'void' can't have return value"
        );
    }

    #[test]
    fn test_edge_bare_return_in_int_function_is_fine() {
        let (_, handler) = lower("int f(){return;}");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_subscripting_a_scalar() {
        assert_eq!(
            first_error("int f(){int a; return a[0];}"),
            "int var is not subscriptable"
        );
    }

    #[test]
    fn test_edge_dimension_count_mismatch() {
        assert_eq!(
            first_error("int f(){int a[2][3]; return a[1];}"),
            "Dimension count mismatch on a: declared 2, subscripted 1"
        );
    }

    #[test]
    fn test_edge_constant_index_out_of_bound() {
        assert_eq!(
            first_error("int f(){int a[2]; return a[2];}"),
            "Constant index 2 out of declared bound 2"
        );
    }

    #[test]
    fn test_edge_open_extent_skips_bound_check() {
        let (_, handler) = lower("int f(int a[]){return a[99];}");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_switch_is_rejected() {
        assert_eq!(
            first_error("int f(int x){switch (x) {} return 0;}"),
            "'switch' is not implemented"
        );
    }

    #[test]
    fn test_edge_assigning_to_a_literal() {
        assert_eq!(first_error("int f(){1 = 2; return 0;}"), "Number can't be evaluated");
    }

    #[test]
    fn test_edge_assigning_to_an_expression() {
        assert_eq!(
            first_error("int f(int x){x + 1 = 2; return 0;}"),
            "Expected left identifier of '='"
        );
    }

    #[test]
    fn test_edge_void_value_in_expression() {
        assert_eq!(
            first_error("void g(){} int f(){int x; x = g(); return x;}"),
            "Can't use VOID value in expression"
        );
    }

    #[test]
    fn test_edge_increment_of_non_lvalue() {
        assert_eq!(
            first_error("int f(){return 5++;}"),
            "lvalue required as increment operand"
        );
    }

    #[test]
    fn test_edge_parameter_redefined_as_local() {
        assert!(first_error("int f(int x){int x; return x;}").starts_with("Redefinition of x"));
    }

    #[test]
    fn test_edge_errors_accumulate() {
        let (_, handler) = lower("int f(){return y + z;}");
        assert_eq!(handler.error_count(), 2);
    }

    #[test]
    fn test_edge_library_calls_resolve() {
        let (analysis, handler) = lower(
            "int main(){int n; int a[10]; n = getarray(a); putint(n); putarray(n, a); putch(10); return 0;}",
        );
        assert!(!handler.has_errors());
        let callees: Vec<&str> = analysis
            .sentences
            .iter()
            .filter_map(|s| match &s.kind {
                SentenceKind::Call { callee, .. } => Some(callee.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(callees, vec!["getarray", "putint", "putarray", "putch"]);
    }

    #[test]
    fn test_edge_array_argument_keeps_extents() {
        let (analysis, handler) = lower("int main(){int a[10]; return getarray(a);}");
        assert!(!handler.has_errors());
        let args = analysis
            .sentences
            .iter()
            .find_map(|s| match &s.kind {
                SentenceKind::Call { args, .. } => Some(args.clone()),
                _ => None,
            })
            .unwrap();
        assert!(matches!(
            &args[0],
            Operand::Var { declared: Some(d), .. } if d == &vec![Some(10)]
        ));
    }

    #[test]
    fn test_edge_comparison_argument_widens() {
        // putint(a < b) passes 0 or 1 as a 32-bit value.
        let (analysis, handler) =
            lower("int main(){int a; int b; putint(a < b); return 0;}");
        assert!(!handler.has_errors());
        assert!(analysis
            .sentences
            .iter()
            .any(|s| matches!(&s.kind, SentenceKind::Zext { .. })));
    }

    #[test]
    fn test_edge_condition_from_plain_int_narrows() {
        // while (x) must compare x against zero before branching.
        let (analysis, handler) = lower("int f(int x){while (x) x = x - 1; return x;}");
        assert!(!handler.has_errors());
        assert!(analysis.sentences.iter().any(|s| matches!(
            &s.kind,
            SentenceKind::Cmp { op: CmpOp::Ne, rhs: Operand::Num { value: 0, .. }, .. }
        )));
    }

    #[test]
    fn test_edge_nested_loops_restore_break_targets() {
        let (analysis, handler) = lower(
            "int f(){int i; int j; i=0; while(i<3){ j=0; while(j<3){ if(j==1) break; j=j+1; } \
             if(i==2) break; i=i+1; } return i;}",
        );
        assert!(!handler.has_errors());
        // Two distinct leave labels are targeted by breaks.
        let mut break_targets: Vec<String> = Vec::new();
        for s in &analysis.sentences {
            if let SentenceKind::Jmp { target } = &s.kind {
                if !break_targets.contains(target) {
                    break_targets.push(target.clone());
                }
            }
        }
        assert!(break_targets.len() >= 2);
    }

    #[test]
    fn test_edge_logical_or_branches_to_leave_on_true() {
        let (analysis, handler) = lower("int f(int x){ if (x==0 || x==9) return 1; return 0; }");
        assert!(!handler.has_errors());
        // For ||, the first branch's true edge goes to the join (leave).
        let first_ifjmp = analysis
            .sentences
            .iter()
            .find_map(|s| match &s.kind {
                SentenceKind::IfJmp {
                    true_label,
                    false_label,
                    ..
                } => Some((true_label.clone(), false_label.clone())),
                _ => None,
            })
            .unwrap();
        let (true_label, false_label) = first_ifjmp;
        let label_pos: std::collections::HashMap<&str, usize> = analysis
            .sentences
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.label.as_deref().map(|l| (l, i)))
            .collect();
        // The false edge continues with the second comparison, which sits
        // before the join in the stream.
        assert!(label_pos[false_label.as_str()] < label_pos[true_label.as_str()]);
    }

    #[test]
    fn test_edge_sentences_serialize() {
        let (analysis, _) = lower("int main(){return 0;}");
        let json = serde_json::to_string(&analysis.sentences).unwrap();
        assert!(json.contains("DefineFunc"));
        assert!(json.contains("Return"));
    }
}
