use proc_macro::{Delimiter, Group, Ident, Punct, Spacing, Span, TokenStream, TokenTree};

/// Turn a function into a `#[test]` that starts from an empty scratch directory,
/// reachable through `tdm_test_support::paths::home()`.
///
/// `#[tdm_test(should_ignore)]` also marks the test `#[ignore]`.
#[proc_macro_attribute]
pub fn tdm_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut ignore = false;
    for token in attr {
        match token {
            TokenTree::Ident(id) if id.to_string() == "should_ignore" => ignore = true,
            TokenTree::Punct(p) if p.as_char() == ',' => {}
            other => panic!("unsupported `tdm_test` option: `{other}`"),
        }
    }

    let mut out = attribute("test");
    if ignore {
        out.extend(attribute("ignore"));
    }

    // The body is the last token of a function item.
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    let body = match tokens.pop() {
        Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Brace => g,
        _ => panic!("`#[tdm_test]` can only be applied to functions"),
    };

    let mut stmts: TokenStream = "tdm_test_support::paths::init_root(option_env!(\"CARGO_TARGET_TMPDIR\"));"
        .parse()
        .expect("scratch setup statement");
    stmts.extend(body.stream());

    out.extend(tokens);
    out.extend([TokenTree::Group(Group::new(Delimiter::Brace, stmts))]);
    out
}

/// `#[name]`
fn attribute(name: &str) -> TokenStream {
    let inner = TokenTree::Ident(Ident::new(name, Span::call_site()));
    [
        TokenTree::Punct(Punct::new('#', Spacing::Alone)),
        TokenTree::Group(Group::new(Delimiter::Bracket, inner.into())),
    ]
    .into_iter()
    .collect()
}
