use bbc::{
    error::Diagnostics,
    options::{Format, Options, Trace},
    translate,
};

const PROGRAM: &str = r#"# Cuenta hacia abajo
let x = 3;
let y;
read(y);
print("x=", x, " y=", y);
if ((x < y) and !(y == 0)) {
  x = x + 1;
} else {
  let z = (x - 1) * 2;
}
while (x > 0) {
  x = x - 1;
}
dotimes (x) {
  print("tick");
}
"#;

fn options(format: Format) -> Options {
    Options {
        format,
        trace: Trace::empty(),
    }
}

fn pretty(text: &str) -> Result<String, Diagnostics> {
    translate("test.bb", text, &options(Format::Pretty))
}

fn compact(text: &str) -> Result<String, Diagnostics> {
    translate("test.bb", text, &options(Format::Compact))
}

fn failure(text: &str) -> String {
    match pretty(text) {
        Ok(output) => panic!("Translation should have failed, got:\n{}", output),
        Err(diagnostics) => diagnostics.to_string(),
    }
}

#[test]
fn pretty_program() {
    let expected = r#"#include <stdio.h>

int main(void) {
    int x;
    int y;
    int z;

    x = 3;
    scanf("%d", &y);
    printf("x=%d y=%d", x, y);
    if ((x < y) && !(y == 0)) {
        x = x + 1;
    }
    else {
        z = (x - 1) * 2;
    }
    while (x > 0) {
        x = x - 1;
    }
    for (int _dotimes0 = 0, _dotimes0_end = x; _dotimes0 < _dotimes0_end; _dotimes0++) {
        printf("tick");
    }
}
"#;

    assert_eq!(pretty(PROGRAM).unwrap(), expected);
}

#[test]
fn compact_program() {
    let expected = concat!(
        "#include <stdio.h>\n",
        "int main(void){int x;int y;int z;",
        "x=3;scanf(\"%d\",&y);printf(\"x=%d y=%d\",x,y);",
        "if((x<y)&&!(y==0)){x=x+1;}else{z=(x-1)*2;}",
        "while(x>0){x=x-1;}",
        "for(int _dotimes0=0,_dotimes0_end=x;_dotimes0<_dotimes0_end;_dotimes0++){printf(\"tick\");}",
        "}\n"
    );

    assert_eq!(compact(PROGRAM).unwrap(), expected);
}

#[test]
fn formats_differ_only_in_whitespace() {
    let strip = |text: String| -> String { text.chars().filter(|c| !c.is_whitespace()).collect() };

    assert_eq!(
        strip(pretty(PROGRAM).unwrap()),
        strip(compact(PROGRAM).unwrap())
    );
}

#[test]
fn empty_program() {
    assert_eq!(
        pretty("").unwrap(),
        "#include <stdio.h>\n\nint main(void) {\n}\n"
    );

    assert_eq!(
        compact("# nada\n\n").unwrap(),
        "#include <stdio.h>\nint main(void){}\n"
    );
}

#[test]
fn declarations_are_hoisted_in_first_seen_order() {
    let output = pretty("let b = 1;\nif (b) {\n  let a;\n  a = b;\n}\nlet c = a;\n").unwrap();

    let expected = r#"#include <stdio.h>

int main(void) {
    int b;
    int a;
    int c;

    b = 1;
    if (b) {
        a = b;
    }
    c = a;
}
"#;

    assert_eq!(output, expected);
}

#[test]
fn blocks_are_balanced() {
    let output = compact(
        "let n = 2;\nwhile (n > 0) {\n  if (n == 1) {\n    dotimes (n) { }\n  } else { }\n  n = n - 1;\n}\n",
    )
    .unwrap();

    let opens = output.matches('{').count();
    let closes = output.matches('}').count();
    assert_eq!(opens, closes);

    let mut depth = 0i32;
    for c in output.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => (),
        }

        assert!(depth >= 0);
    }
}

#[test]
fn print_argument_order() {
    let output = compact("let x = 1;\nlet y = 2;\nprint(\"x=\", x, \" y=\", y);").unwrap();
    assert!(output.contains("printf(\"x=%d y=%d\",x,y);"));
}

#[test]
fn print_escapes_percent() {
    let output = compact("let p = 50;\nprint(p, \"% done\\n\");").unwrap();
    assert!(output.contains("printf(\"%d%% done\\n\",p);"));
}

#[test]
fn boolean_operators() {
    let output = compact("let a;\nlet b;\nif (a and b) { }\nwhile (a or b) { }").unwrap();

    assert!(output.contains("if(a&&b){}"));
    assert!(output.contains("while(a||b){}"));
}

#[test]
fn nested_dotimes_use_distinct_counters() {
    let output = pretty("dotimes (5) {\n  dotimes (2) { }\n}\ndotimes (1) { }").unwrap();

    assert!(output.contains("for (int _dotimes0 = 0; _dotimes0 < 5; _dotimes0++) {"));
    assert!(output.contains("        for (int _dotimes1 = 0; _dotimes1 < 2; _dotimes1++) {"));
    assert!(output.contains("for (int _dotimes2 = 0; _dotimes2 < 1; _dotimes2++) {"));
}

#[test]
fn self_referential_initializer() {
    let output = compact("let x = x + 1;").unwrap();
    assert_eq!(output, "#include <stdio.h>\nint main(void){int x;x=x+1;}\n");
}

#[test]
fn undeclared_names_fail() {
    for text in [
        "x = 1;",
        "let y = x;",
        "print(x);",
        "read(x);",
        "if (x) { }",
        "dotimes (x) { }",
    ] {
        let report = failure(text);
        assert!(report.starts_with("Semantic error: "), "{}", report);
        assert!(report.contains("`x`"), "{}", report);
    }
}

#[test]
fn redeclaration_fails() {
    let report = failure("let x;\nprint(\"hi\");\nlet x = 2;\n");

    let expected = "Semantic error: Redefinition of `x`, names may only be declared once\n \
                    --> test.bb:3:5\n  \
                    |\n\
                    3 | let x = 2;\n  \
                    |     ^\n\
                    \n\
                    Translation failed with 1 error\n";

    assert_eq!(report, expected);
}

#[test]
fn overflow_is_distinct_from_syntax_errors() {
    let report = failure("let x = 99999999999;");

    assert!(report.starts_with("Syntax error: Integer literal `99999999999` overflows"));
    assert!(report.contains(" --> test.bb:[1:9-1:19]"));

    let diagnostics = pretty("let x = 2147483648;").unwrap_err();
    let messages: Vec<_> = diagnostics.messages().collect();
    assert_eq!(
        messages,
        ["Integer literal `2147483648` overflows, valid range is [0, 2147483647]"]
    );
}

#[test]
fn unknown_input_is_rejected() {
    let report = failure("let x;\nx = 1 $ 2;");
    assert!(report.starts_with("Syntax error: Unrecognized input `$`"));
    assert!(report.contains(" --> test.bb:2:7"));
}

#[test]
fn syntax_errors_name_the_offending_token() {
    let report = failure("let x = 1\n");
    assert!(report.starts_with("Syntax error: Expected `;`, found end of input instead"));

    let report = failure("while (1) {\n");
    assert!(report.starts_with("Syntax error: Expected `}`, found end of input instead"));
}

#[test]
fn long_expressions_do_not_nest() {
    let terms = 100_000;

    let mut text = String::from("let x = 1");
    text.push_str(&" + 1".repeat(terms));
    text.push_str(";\nif ((x)");
    text.push_str(&" and (x)".repeat(terms));
    text.push_str(") { }\n");

    let output = compact(&text).unwrap();

    let mut expected = String::from("x=1");
    expected.push_str(&"+1".repeat(terms));
    expected.push_str(";if((x)");
    expected.push_str(&"&&(x)".repeat(terms));
    expected.push_str("){}");

    assert!(output.contains(&expected));
}

#[test]
fn variable_bound_is_fixed_on_entry() {
    let output = compact("let n = 3;\ndotimes (n) {\n  n = n - 1;\n}\n").unwrap();

    assert!(output.contains(
        "for(int _dotimes0=0,_dotimes0_end=n;_dotimes0<_dotimes0_end;_dotimes0++){n=n-1;}"
    ));
}
