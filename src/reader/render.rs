use pulldown_cmark::{Options, Parser, html};

/// Render chapter Markdown to an HTML fragment.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// Chapter length as novel platforms count it: every non-whitespace
/// character, CJK and punctuation included.
pub fn count_words(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
