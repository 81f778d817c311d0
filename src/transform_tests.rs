#[cfg(test)]
mod tests {
    use crate::renamer::ReservedNameCollector;
    use crate::transform::{apply_edits, transpile, Edit};
    use crate::validate::{ParseStage, ShapeViolation, TranspileError};
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use pretty_assertions::assert_eq;

    fn shape_error(source: &str) -> ShapeViolation {
        match transpile(source) {
            Err(TranspileError::InvalidShape { reason, .. }) => reason,
            other => panic!("expected shape violation for {:?}, got {:?}", source, other),
        }
    }

    /// Rebuilds the text front to back from the segments between reserved
    /// names, never touching an offset after it has been used.
    fn forward_rewrite(source: &str) -> String {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::default().with_script(true)).parse();
        assert!(ret.errors.is_empty());
        let occurrences = ReservedNameCollector::collect(&ret.program);

        let mut out = String::new();
        let mut cursor = 0usize;
        for occurrence in occurrences {
            out.push_str(&source[cursor..occurrence.start as usize]);
            out.push_str(occurrence.replacement);
            cursor = occurrence.end as usize;
        }
        out.push_str(&source[cursor..]);
        out
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Basic output
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_minimal_script_round_trip() {
        let out = transpile("module.exports = function(context, args) { return 1 }").unwrap();
        assert_eq!(out, "function(context, args) { return 1 }");
    }

    #[test]
    fn test_trailing_semicolon_trimmed_once() {
        let out = transpile("module.exports = function(context, args) { return 1 };").unwrap();
        assert_eq!(out, "function(context, args) { return 1 }");

        let out = transpile("module.exports = function(context, args) { return 1 };;");
        // `;;` is a second (empty) statement
        assert!(out.is_err());
    }

    #[test]
    fn test_trailing_newline_keeps_semicolon() {
        let out = transpile("module.exports = function(c, a) { return 1 };\n").unwrap();
        assert_eq!(out, "function(c, a) { return 1 };\n");
    }

    #[test]
    fn test_database_handle_replaced() {
        let out = transpile("module.exports = function(context, args) { return $db }").unwrap();
        assert_eq!(out, "function(context, args) { return #db }");
    }

    #[test]
    fn test_markers_rewritten_to_short_forms() {
        let source = "module.exports = function(c, a) { return [_START, _ST, _TIMEOUT, _TO, _END] }";
        let out = transpile(source).unwrap();
        assert_eq!(out, "function(c, a) { return [_ST, _ST, _TO, _TO, _END] }");
    }

    #[test]
    fn test_properties_and_strings_untouched() {
        let source = "module.exports = function(c, a) { return { $db: a.$db, s: \"$db\", t: $fs.x } }";
        let out = transpile(source).unwrap();
        assert_eq!(
            out,
            "function(c, a) { return { $db: a.$db, s: \"$db\", t: #fs.x } }"
        );
    }

    #[test]
    fn test_shorthand_property_value_rewritten() {
        let out = transpile("module.exports = function(c, a) { return { $G } }").unwrap();
        assert_eq!(out, "function(c, a) { return { #G } }");
    }

    #[test]
    fn test_formatting_and_comments_preserved() {
        let source = "module.exports = function (context, args) {\n  // keep me\n  let x = $hs.caller() /* and me */\n\n  return x\n}";
        let out = transpile(source).unwrap();
        assert_eq!(
            out,
            "function (context, args) {\n  // keep me\n  let x = #hs.caller() /* and me */\n\n  return x\n}"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Reverse-order splicing
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_nested_and_adjacent_occurrences() {
        let source = "module.exports = function(c, a) { return $db[$fs]($hs,$ms)+_START+_TIMEOUT+$ls($ns($D($FMCL)))-_TO }";
        let out = transpile(source).unwrap();
        assert_eq!(
            out,
            "function(c, a) { return #db[#fs](#hs,#ms)+_ST+_TO+#ls(#ns(#D(#FMCL)))-_TO }"
        );
    }

    #[test]
    fn test_reverse_splice_matches_forward_rebuild() {
        let sources = [
            "module.exports = function(c, a) { return 1 }",
            "module.exports = function(c, a) { return $db }",
            "module.exports = function(c, a) { _START; _TIMEOUT; _START }",
            "module.exports = function(c, a) { return _TIMEOUT?_START:[_TIMEOUT,{k:_START}] }",
            "module.exports = function(c, a) { if (Date.now() - _START > _TIMEOUT - 500) { return $fs.chats.send({ msg: $G.x }) } }",
            "module.exports = function(c, a) { const f = () => _TIMEOUT; return f() + _TIMEOUT + `${_START}${_START}` }",
        ];

        for source in sources {
            let expected = forward_rewrite(source);
            let expected = expected
                .strip_prefix("module.exports = ")
                .unwrap()
                .to_string();
            assert_eq!(transpile(source).unwrap(), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_apply_edits_orders_by_offset() {
        let edits = vec![
            Edit::replace(0, 1, "AAA"),
            Edit::insert(4, "<"),
            Edit::replace(4, 5, "EEE"),
            Edit::delete(6, 8),
        ];
        assert_eq!(apply_edits("abcdefghij", edits), "AAAbcd<EEEfij");
    }

    #[test]
    fn test_apply_edits_empty() {
        assert_eq!(apply_edits("unchanged", vec![]), "unchanged");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Autocomplete
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_autocomplete_injected_after_opening_brace() {
        let source = "// +autocomplete hello world\nmodule.exports = function(context, args) { return 1 }";
        let out = transpile(source).unwrap();
        assert_eq!(
            out,
            "// +autocomplete hello world\nfunction(context, args) {//hello world\n return 1 }"
        );
    }

    #[test]
    fn test_autocomplete_before_leading_reserved_name() {
        let source = "// +autocomplete t:1\nmodule.exports = function(c, a) {$db.f()}";
        let out = transpile(source).unwrap();
        assert_eq!(out, "// +autocomplete t:1\nfunction(c, a) {//t:1\n#db.f()}");
    }

    #[test]
    fn test_empty_autocomplete_injects_nothing() {
        let source = "// +autocomplete\nmodule.exports = function(c, a) { return 1 }";
        let out = transpile(source).unwrap();
        assert_eq!(out, "// +autocomplete\nfunction(c, a) { return 1 }");
    }

    #[test]
    fn test_unknown_directive_is_not_fatal() {
        let source = "// +turbo\nmodule.exports = function(c, a) { return 1 }";
        let out = transpile(source).unwrap();
        assert_eq!(out, "// +turbo\nfunction(c, a) { return 1 }");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_two_statements_rejected() {
        let reason = shape_error(
            "var x = 1;\nmodule.exports = function(context, args) { return x }",
        );
        assert_eq!(reason, ShapeViolation::StatementCount(2));
    }

    #[test]
    fn test_empty_script_rejected() {
        assert_eq!(shape_error(""), ShapeViolation::StatementCount(0));
        assert_eq!(shape_error("// just a comment"), ShapeViolation::StatementCount(0));
    }

    #[test]
    fn test_use_strict_counts_as_statement() {
        let reason = shape_error("\"use strict\";\nmodule.exports = function(c, a) {}");
        assert_eq!(reason, ShapeViolation::StatementCount(2));
    }

    #[test]
    fn test_declaration_rejected() {
        let reason = shape_error("function main(context, args) { return 1 }");
        assert_eq!(reason, ShapeViolation::NotExpressionStatement);
    }

    #[test]
    fn test_bare_function_call_rejected() {
        assert_eq!(shape_error("main(1)"), ShapeViolation::NotAssignment);
    }

    #[test]
    fn test_wrong_target_rejected() {
        assert_eq!(
            shape_error("exports.main = function(c, a) {}"),
            ShapeViolation::WrongTarget
        );
        assert_eq!(
            shape_error("module.main = function(c, a) {}"),
            ShapeViolation::WrongTarget
        );
        assert_eq!(
            shape_error("module[\"exports\"] = function(c, a) {}"),
            ShapeViolation::WrongTarget
        );
        assert_eq!(
            shape_error("exports = function(c, a) {}"),
            ShapeViolation::WrongTarget
        );
    }

    #[test]
    fn test_compound_assignment_rejected() {
        assert_eq!(
            shape_error("module.exports += function(c, a) {}"),
            ShapeViolation::NotPlainAssignment
        );
    }

    #[test]
    fn test_arrow_function_rejected() {
        assert_eq!(
            shape_error("module.exports = (context, args) => 1"),
            ShapeViolation::NotFunctionExpression
        );
        assert_eq!(
            shape_error("module.exports = 42"),
            ShapeViolation::NotFunctionExpression
        );
    }

    #[test]
    fn test_validation_applies_when_minifying() {
        let reason = shape_error(
            "// +minify\n// +mangle\nvar helper = Date.now();\nmodule.exports = function(context, args) { return helper }",
        );
        assert!(matches!(reason, ShapeViolation::StatementCount(_)));
    }

    #[test]
    fn test_shape_error_message_names_required_form() {
        let err = transpile("module.exports = 1").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(
            "A script must consist of exactly one module.exports = function(context, args) { ... } declaration"
        ));
        assert!(message.contains("at 1:18"), "{}", message);
    }

    #[test]
    fn test_shape_error_location() {
        match transpile("module.exports = function(c, a) {}\nfoo()") {
            Err(TranspileError::InvalidShape { location, .. }) => {
                assert_eq!(location.line, 2);
                assert_eq!(location.column, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let err = transpile("module.exports = function(context, args) { return ( }").unwrap_err();
        assert!(matches!(
            err,
            TranspileError::Parse {
                stage: ParseStage::Directives,
                ..
            }
        ));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Minify / mangle
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_minified_output_is_bare_function() {
        let source = "// +minify\nmodule.exports = function(context, args) {\n  // a comment\n  return $db.f({ user: context.caller })\n};\n";
        let out = transpile(source).unwrap();
        assert!(out.starts_with("function"), "{}", out);
        assert!(!out.contains("module.exports"), "{}", out);
        assert!(!out.ends_with(';'), "{}", out);
        assert!(!out.contains("a comment"), "{}", out);
        assert!(out.contains("#db.f("), "{}", out);
        assert!(!out.contains("$db"), "{}", out);
    }

    #[test]
    fn test_minify_with_autocomplete() {
        let source = "// +minify\n// +autocomplete target:\"#s.a.b\"\nmodule.exports = function(context, args) {\n  return args.target.call()\n};\n";
        let out = transpile(source).unwrap();
        let body = out.split_once('{').unwrap().1;
        assert!(body.starts_with("//target:\"#s.a.b\"\n"), "{}", out);
    }

    #[test]
    fn test_minified_output_targets_es2015() {
        let source = "// +minify\nmodule.exports = function(context, args) {\n  var o = args.o;\n  var v = o == null ? void 0 : o.v;\n  return v == null ? 5 : v\n};\n";
        let out = transpile(source).unwrap();
        assert!(out.starts_with("function"), "{}", out);
        assert!(!out.contains("?."), "{}", out);
        assert!(!out.contains("??"), "{}", out);
    }

    #[test]
    fn test_mangle_keeps_reserved_names() {
        let source = r#"// +minify
// +mangle
module.exports = function(context, args) {
  var _ST = args.list;
  var counter = args.count;
  _ST.push(counter);
  _ST.push(counter + 1);
  return { ok: $db.f(_ST), end: _END };
};
"#;
        let out = transpile(source).unwrap();
        assert!(out.contains("_ST.push("), "{}", out);
        assert!(out.contains("#db.f(_ST)"), "{}", out);
        assert!(out.contains("_END"), "{}", out);
        assert!(!out.contains("counter"), "{}", out);
        assert!(!out.contains("$db"), "{}", out);
    }

    #[test]
    fn test_mangle_without_minify_does_nothing() {
        let source = "// +mangle\nmodule.exports = function(context, args) { var counter = 1; return counter }";
        let out = transpile(source).unwrap();
        assert!(out.ends_with("function(context, args) { var counter = 1; return counter }"));
    }
}
