// prosefix-core/tests/protect_tests.rs
use prosefix_core::protect::{ShortcodeKind, SpanProtector};

#[test]
fn finds_paired_angle_shortcode() {
    let protector = SpanProtector::new();
    let shortcodes = protector
        .find_shortcodes("{{< highlight javascript >}}console.log('test');{{< /highlight >}}");
    assert_eq!(shortcodes.len(), 1);
    assert_eq!(shortcodes[0].kind, ShortcodeKind::Paired);
    assert_eq!(shortcodes[0].name, "highlight");
    assert_eq!(shortcodes[0].content, "console.log('test');");
}

#[test]
fn finds_paired_percent_shortcode() {
    let protector = SpanProtector::new();
    let shortcodes = protector.find_shortcodes("{{% note %}}This is a note{{% /note %}}");
    assert_eq!(shortcodes.len(), 1);
    assert_eq!(shortcodes[0].kind, ShortcodeKind::Paired);
    assert_eq!(shortcodes[0].name, "note");
    assert_eq!(shortcodes[0].content, "This is a note");
}

#[test]
fn finds_self_closing_shortcode() {
    let protector = SpanProtector::new();
    let shortcodes = protector.find_shortcodes(r#"{{< figure src="image.jpg" alt="Test" >}}"#);
    assert_eq!(shortcodes.len(), 1);
    assert_eq!(shortcodes[0].kind, ShortcodeKind::SelfClosing);
    assert_eq!(shortcodes[0].name, "figure");
    assert_eq!(shortcodes[0].content, "");
}

#[test]
fn finds_mixed_shortcodes() {
    let protector = SpanProtector::new();
    let shortcodes = protector.find_shortcodes(
        r#"{{< highlight go >}}func main() {}{{< /highlight >}} and {{< figure src="test.jpg" >}}"#,
    );
    assert_eq!(shortcodes.len(), 2);
    assert_eq!(shortcodes[0].kind, ShortcodeKind::Paired);
    assert_eq!(shortcodes[0].name, "highlight");
    assert_eq!(shortcodes[0].content, "func main() {}");
    assert_eq!(shortcodes[1].kind, ShortcodeKind::SelfClosing);
    assert_eq!(shortcodes[1].name, "figure");
}

#[test]
fn finds_nothing_in_plain_markdown() {
    let protector = SpanProtector::new();
    let shortcodes =
        protector.find_shortcodes("This is regular markdown text with no shortcodes.");
    assert!(shortcodes.is_empty());
}

#[test]
fn same_name_nesting_defers_to_inner_closer() {
    let protector = SpanProtector::new();
    let input = "{{< note >}}outer {{< note >}}inner{{< /note >}} tail{{< /note >}}";
    let shortcodes = protector.find_shortcodes(input);

    let paired: Vec<_> = shortcodes
        .iter()
        .filter(|sc| sc.kind == ShortcodeKind::Paired)
        .collect();
    assert_eq!(paired.len(), 1);
    assert_eq!(paired[0].content, "inner");

    // The outer start tag finds no unshadowed closer and degrades to a
    // self-closing span; the trailing closer stays raw text. Masking must
    // still reverse cleanly.
    let (masked, placeholders) = protector.protect(input);
    assert_eq!(protector.restore(&masked, &placeholders), input);
}

#[test]
fn protect_restore_is_identity_without_spans() {
    let protector = SpanProtector::new();
    let input = "Nothing structured here, just prose.\n";
    let (masked, placeholders) = protector.protect(input);
    assert_eq!(masked, input);
    assert!(placeholders.is_empty());
    assert_eq!(protector.restore(&masked, &placeholders), input);
}

#[test]
fn protect_restore_round_trips_a_full_document() {
    let protector = SpanProtector::new();
    let input = "# Test Document\n\n\
        This is a test with {{< highlight javascript >}}\n\
        console.log('test');\n\
        {{< /highlight >}} and {{% note %}}\n\
        This is a note\n\
        {{% /note %}} shortcodes.\n\n\
        Also {{< figure src=\"test.jpg\" >}} here.\n\n\
        ```go\nfunc main() {}\n```\n\n\
        Inline `code` and a [link](https://example.com) and [text][ref].\n\n\
        [ref]: https://example.com/ref\n";

    let (masked, placeholders) = protector.protect(input);
    assert!(!placeholders.is_empty());
    assert!(!masked.contains("{{<"));
    assert!(!masked.contains("{{%"));
    assert!(!masked.contains("console.log"));
    assert!(!masked.contains("func main"));
    assert!(!masked.contains("https://example.com"));

    assert_eq!(protector.restore(&masked, &placeholders), input);
}

#[test]
fn adjacent_spans_round_trip() {
    let protector = SpanProtector::new();
    let input = "`one``two` [a](b)[c](d)";
    let (masked, placeholders) = protector.protect(input);
    assert_eq!(protector.restore(&masked, &placeholders), input);
}

#[test]
fn code_span_inside_shortcode_body_round_trips() {
    // The code span is masked first, so the paired shortcode's stored
    // original contains a placeholder token. Restoration resolves the outer
    // span before the inner one.
    let protector = SpanProtector::new();
    let input = "{{< note >}}use `jquery` here{{< /note >}}";
    let (masked, placeholders) = protector.protect(input);
    assert!(!masked.contains("jquery"));
    assert_eq!(protector.restore(&masked, &placeholders), input);
}

#[test]
fn placeholder_map_resolves_tokens() {
    let protector = SpanProtector::new();
    let (masked, placeholders) = protector.protect("see `inline code` here");
    assert_eq!(placeholders.len(), 1);

    let token = placeholders.tokens().next().unwrap().to_string();
    assert!(masked.contains(&token));
    assert_eq!(placeholders.get(&token), Some("`inline code`"));
}

#[test]
fn unknown_tokens_are_left_untouched() {
    let protector = SpanProtector::new();
    let (_, placeholders) = protector.protect("plain");
    let text = "something \u{E000}CODE_SPAN_99\u{E000} odd";
    assert_eq!(protector.restore(text, &placeholders), text);
}

#[test]
fn validate_accepts_well_formed_document() {
    let protector = SpanProtector::new();
    let input = "# Title\n\n\
        {{< highlight go >}}\nfunc main() {\n    fmt.Println(\"Hello\")\n}\n{{< /highlight >}}\n\n\
        {{% note %}}\nThis is a note\n{{% /note %}}\n";
    assert!(protector.validate(input).is_empty());
}

#[test]
fn validate_flags_empty_paired_shortcode() {
    let protector = SpanProtector::new();
    let issues = protector.validate("{{< highlight >}}{{< /highlight >}}");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].contains("empty paired shortcode"));
}

#[test]
fn validate_flags_unclosed_code_block() {
    let protector = SpanProtector::new();
    let issues = protector.validate("# Title\n\n```go\nfunc main() {}\n// missing fence\n");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].contains("unclosed code block"));
}

#[test]
fn validate_flags_empty_link_parts() {
    let protector = SpanProtector::new();
    let issues = protector.validate("An empty []() link.\n");
    assert_eq!(issues.len(), 2);
    assert!(issues[0].contains("empty link text"));
    assert!(issues[1].contains("empty link URL"));
}
