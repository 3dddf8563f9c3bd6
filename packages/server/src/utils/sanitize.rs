use std::collections::HashSet;

/// Strip markup from user-supplied text before it is stored or echoed back.
///
/// Every tag is removed and the contents of `script` and `style` elements are
/// dropped entirely. The result is plain text: character references are
/// decoded, so `a & b` and `<i>a</i> &amp; b` both come out as `a & b`.
pub fn clean_text(input: &str) -> String {
    let mut cleaner = ammonia::Builder::default();
    cleaner.tags(HashSet::new());
    unescape(&cleaner.clean(input).to_string())
}

/// Undo the escaping html5ever applies to text nodes when serializing.
fn unescape(html: &str) -> String {
    if !html.contains('&') {
        return html.to_string();
    }
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let (decoded, len) = match rest {
            r if r.starts_with("&amp;") => ('&', 5),
            r if r.starts_with("&lt;") => ('<', 4),
            r if r.starts_with("&gt;") => ('>', 4),
            r if r.starts_with("&quot;") => ('"', 6),
            r if r.starts_with("&nbsp;") => ('\u{a0}', 6),
            _ => ('&', 1),
        };
        out.push(decoded);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}
