use serde_json::json;
use stepwise_core::{parse_call, render_call, render_response, ArgumentFormat, StepwiseError};

#[test]
fn parses_single_positional_string() {
    let (call, fmt) = parse_call("Search(\"how tall is Everest?\")").unwrap();
    assert_eq!(call.name, "Search");
    assert_eq!(call.args, vec![json!("how tall is Everest?")]);
    assert!(call.kwargs.is_empty());
    assert_eq!(fmt, ArgumentFormat::Python);
}

#[test]
fn parses_keyword_arguments() {
    let (call, _) = parse_call("Search(\"everest\", limit=3, exact=true)").unwrap();
    assert_eq!(call.args, vec![json!("everest")]);
    assert_eq!(call.kwargs.get("limit"), Some(&json!(3)));
    assert_eq!(call.kwargs.get("exact"), Some(&json!(true)));
}

#[test]
fn parses_single_quoted_strings() {
    let (call, _) = parse_call("Search('who invented relativity?')").unwrap();
    assert_eq!(call.args, vec![json!("who invented relativity?")]);
}

#[test]
fn commas_inside_literals_do_not_split() {
    let (call, _) = parse_call("F(\"a, b\", [1, 2], {\"k\": [3, 4]})").unwrap();
    assert_eq!(
        call.args,
        vec![json!("a, b"), json!([1, 2]), json!({"k": [3, 4]})]
    );
}

#[test]
fn quoted_parens_do_not_close_the_call() {
    let (call, _) = parse_call("Search(\"closing ) paren\")").unwrap();
    assert_eq!(call.args, vec![json!("closing ) paren")]);
}

#[test]
fn trailing_text_after_call_is_ignored() {
    let (call, _) = parse_call("Search(\"x\")\nand then some rambling").unwrap();
    assert_eq!(call.name, "Search");
    assert_eq!(call.args, vec![json!("x")]);
}

#[test]
fn parses_empty_argument_list() {
    let (call, _) = parse_call("ListTools()").unwrap();
    assert!(call.args.is_empty());
    assert!(call.kwargs.is_empty());
}

#[test]
fn parses_json_object_form() {
    let (call, fmt) = parse_call("Reverse {\"text\": \"Albert Einstein\"}").unwrap();
    assert_eq!(call.name, "Reverse");
    assert!(call.args.is_empty());
    assert_eq!(call.kwargs.get("text"), Some(&json!("Albert Einstein")));
    assert_eq!(fmt, ArgumentFormat::Json);
}

#[test]
fn malformed_calls_fail_with_parse_error() {
    for text in [
        "not a call at all!",
        "Name(unclosed",
        "Name(bareword)",
        "Name{not json}",
        "Name",
        "",
    ] {
        let err = parse_call(text).unwrap_err();
        assert!(
            matches!(err, StepwiseError::ParseFailed { .. }),
            "expected ParseFailed for {text:?}, got {err:?}"
        );
    }
}

#[test]
fn python_rendering_roundtrips() {
    let (call, fmt) = parse_call("Search(\"everest\", limit=3)").unwrap();
    let rendered = render_call(&call, fmt);
    assert_eq!(rendered, "Search(\"everest\", limit=3)");
    let (reparsed, _) = parse_call(&rendered).unwrap();
    assert_eq!(reparsed, call);
}

#[test]
fn json_rendering_roundtrips() {
    let (call, fmt) = parse_call("Reverse {\"text\": \"abc\"}").unwrap();
    let rendered = render_call(&call, fmt);
    assert_eq!(rendered, "Reverse {\"text\":\"abc\"}");
    let (reparsed, reparsed_fmt) = parse_call(&rendered).unwrap();
    assert_eq!(reparsed, call);
    assert_eq!(reparsed_fmt, ArgumentFormat::Json);
}

#[test]
fn render_response_strings_are_bare_except_json() {
    assert_eq!(render_response(None, &json!("8,849 m")), "8,849 m");
    assert_eq!(
        render_response(Some(ArgumentFormat::Python), &json!("text")),
        "text"
    );
    assert_eq!(
        render_response(Some(ArgumentFormat::Json), &json!("text")),
        "\"text\""
    );
    assert_eq!(render_response(None, &json!(238)), "238");
    assert_eq!(
        render_response(None, &json!({"k": 1})),
        "{\"k\":1}"
    );
}
