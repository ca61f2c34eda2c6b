use scraper::{ElementRef, Html, Selector};

// containers that usually hold the recipe card or the article body
const BODY_CANDIDATES: [&str; 8] = [
    "[itemtype*=Recipe]",
    ".wprm-recipe-container",
    ".tasty-recipes",
    ".recipe",
    "article",
    "main",
    "[role=main]",
    "#content",
];

const MIN_BODY_CHARS: usize = 200;

/// Reduce a recipe page to the text handed to inference: title, preview image,
/// any schema.org Recipe JSON-LD, then the readable body.
pub fn page_text(html: &str, max_chars: usize) -> Option<String> {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, "meta[property='og:title']").or_else(|| first_text(&doc, "title"));
    let image = meta_content(&doc, "meta[property='og:image']");
    let structured = recipe_json_ld(&doc);
    let body = body_text(&doc);

    if structured.is_empty() && body.is_none() { return None; }

    let mut out = String::new();
    if let Some(t) = title { out.push_str(&format!("Title: {t}\n")); }
    if let Some(i) = image { out.push_str(&format!("Image: {i}\n")); }
    for block in &structured {
        out.push_str("Structured data:\n");
        out.push_str(block);
        out.push('\n');
    }
    if let Some(b) = body {
        out.push_str("Content:\n");
        out.push_str(&b);
    }
    Some(truncate_chars(out.trim(), max_chars))
}

fn meta_content(doc: &Html, sel_str: &str) -> Option<String> {
    let sel = Selector::parse(sel_str).ok()?;
    let content = doc.select(&sel).next()?.value().attr("content")?.trim();
    if content.is_empty() { None } else { Some(content.to_string()) }
}

fn first_text(doc: &Html, sel_str: &str) -> Option<String> {
    let sel = Selector::parse(sel_str).ok()?;
    let node = doc.select(&sel).next()?;
    let s = collapse_whitespace(&node.text().collect::<String>());
    if s.is_empty() { None } else { Some(s) }
}

fn recipe_json_ld(doc: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse("script[type='application/ld+json']") else { return Vec::new() };
    doc.select(&sel)
        .map(|n| n.text().collect::<String>())
        .map(|s| s.trim().to_string())
        .filter(|s| s.contains("Recipe"))
        .collect()
}

fn body_text(doc: &Html) -> Option<String> {
    for sel in BODY_CANDIDATES.iter() {
        if let Some(text) = text_under(doc, sel) {
            if text.chars().count() >= MIN_BODY_CHARS { return Some(text); }
        }
    }

    // fallback: every paragraph and list item on the page
    let sel = Selector::parse("p, li").ok()?;
    let lines: Vec<String> = doc
        .select(&sel)
        .map(|n| collapse_whitespace(&n.text().collect::<String>()))
        .filter(|s| !s.is_empty())
        .collect();
    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

fn text_under(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).next()?;
    let s = normalize_lines(&visible_text(node));
    if s.is_empty() { None } else { Some(s) }
}

// text of `node` minus script/style contents
fn visible_text(node: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in node.descendants() {
        if let Some(text) = child.value().as_text() {
            let hidden = child
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| matches!(a.value().name(), "script" | "style" | "noscript"));
            if !hidden { out.push_str(text); }
        } else if let Some(el) = child.value().as_element() {
            if matches!(el.name(), "p" | "li" | "br" | "div" | "h1" | "h2" | "h3" | "h4" | "tr") { out.push('\n'); }
        }
    }
    out
}

fn normalize_lines(s: &str) -> String {
    let mut out = String::new();
    for line in s.lines() {
        let trimmed = collapse_whitespace(line);
        if trimmed.is_empty() { continue; }
        if !out.is_empty() { out.push('\n'); }
        out.push_str(&trimmed);
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_title_image_and_json_ld() {
        let html = r#"
        <html><head>
          <title>Ignored when og:title exists</title>
          <meta property="og:title" content="Best Banana Bread">
          <meta property="og:image" content="https://example.com/bread.jpg">
          <script type="application/ld+json">{"@type":"Recipe","name":"Banana Bread"}</script>
          <script type="application/ld+json">{"@type":"Organization"}</script>
        </head><body><p>Mash the bananas.</p></body></html>
        "#;
        let got = page_text(html, 10_000).unwrap();
        assert!(got.starts_with("Title: Best Banana Bread\nImage: https://example.com/bread.jpg\n"));
        assert!(got.contains(r#"{"@type":"Recipe","name":"Banana Bread"}"#));
        assert!(!got.contains("Organization"));
        assert!(got.contains("Mash the bananas."));
    }

    #[test]
    fn prefers_recipe_container_over_page_chrome() {
        let steps = "Whisk the eggs and sugar until pale. ".repeat(8);
        let html = format!(
            r#"<html><body><nav><p>Home</p></nav>
            <div class="recipe"><h2>Method</h2><p>{steps}</p><script>var x = 1;</script></div>
            <footer><p>Subscribe</p></footer></body></html>"#
        );
        let got = page_text(&html, 10_000).unwrap();
        assert!(got.contains("Method\nWhisk the eggs"));
        assert!(!got.contains("Subscribe"));
        assert!(!got.contains("var x"));
    }

    #[test]
    fn falls_back_to_paragraphs_and_list_items() {
        let html = r#"<html><body><ul><li>2 cups  flour</li><li>1 egg</li></ul><p>Bake.</p></body></html>"#;
        let got = page_text(html, 10_000).unwrap();
        assert!(got.contains("2 cups flour\n1 egg\nBake."));
    }

    #[test]
    fn none_when_nothing_readable() {
        let html = r#"<html><head><title>Empty</title></head><body></body></html>"#;
        assert!(page_text(html, 10_000).is_none());
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("crème brûlée", 5), "crème");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
