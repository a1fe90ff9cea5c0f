//! Treemap HTML writer.
//!
//! Serializes a [`Page`] into a standalone HTML document with a dark theme:
//! header with the bundle selector, byte totals of the shown view, then one
//! pre-rendered treemap per selector entry. The embedded script switches
//! between them when the selector changes.
//!
//! # Example
//!
//! ```
//! use bundlemap::dom::Size;
//! use bundlemap::host::HostLink;
//! use bundlemap::html::render_page;
//! use bundlemap::page::{Page, build_document};
//! use bundlemap::viewer::ViewerConfig;
//!
//! let doc = build_document(Size { width: 1200.0, height: 800.0 });
//! let mut page = Page::load(doc, HostLink::detached(), ViewerConfig::default()).unwrap();
//! let html = render_page(&mut page, "Bundle treemap");
//! assert!(html.contains("bundle-selector"));
//! ```

use std::fmt::Write;

use tracing::warn;

use crate::dom::{Document, ElementId};
use crate::error::Error;
use crate::page::{Event, Page};

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `1234567` -> `"1,234,567"`. Fractions are rounded away.
pub fn format_bytes(n: f64) -> String {
    let s = (n.max(0.0).round() as u64).to_string();
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

fn write_element(out: &mut String, doc: &Document, id: ElementId, indent: usize) {
    let Some(el) = doc.get(id) else { return };
    let pad = "    ".repeat(indent);

    write!(out, "{pad}<{}", el.tag).unwrap();
    for (name, value) in &el.attrs {
        if value.is_empty() {
            write!(out, " {name}").unwrap();
        } else {
            write!(out, " {name}=\"{}\"", escape_html(value)).unwrap();
        }
    }
    if !el.classes.is_empty() {
        write!(out, " class=\"{}\"", escape_html(&el.classes.join(" "))).unwrap();
    }
    if !el.style.is_empty() {
        let style: Vec<String> = el.style.iter().map(|(p, v)| format!("{p}:{v}")).collect();
        write!(out, " style=\"{}\"", escape_html(&style.join(";"))).unwrap();
    }
    out.push('>');
    out.push_str(&escape_html(&el.text));

    if el.children().is_empty() {
        writeln!(out, "</{}>", el.tag).unwrap();
        return;
    }
    out.push('\n');
    for &child in el.children() {
        write_element(out, doc, child, indent + 1);
    }
    writeln!(out, "{pad}</{}>", el.tag).unwrap();
}

/// One pre-rendered view per selector value.
struct View {
    value: String,
    total: f64,
    wasted: f64,
    markup: String,
}

/// Shows every selector entry in turn and keeps its markup, then puts the
/// page back on the entry it started from.
fn capture_views(page: &mut Page) -> Vec<View> {
    if page.viewer().is_none() {
        return Vec::new();
    }
    let initial = page
        .document()
        .select_value(page.selector())
        .map(str::to_owned);

    let mut views = Vec::new();
    for value in page.selector_values() {
        if let Err(err) = page.dispatch(Event::SelectorChange(value.clone())) {
            warn!(%err, view = %value, "skipping view");
            continue;
        }
        let (total, wasted) = page
            .viewer()
            .and_then(|v| v.current_root_node())
            .map_or((0.0, 0.0), |n| (n.size, n.wasted_bytes));
        let doc = page.document();
        let mut markup = String::new();
        for &child in doc.get(page.mount()).map(|m| m.children()).unwrap_or_default() {
            write_element(&mut markup, doc, child, 2);
        }
        views.push(View { value, total, wasted, markup });
    }

    if let Some(initial) = initial {
        if let Err(err) = page.dispatch(Event::SelectorChange(initial)) {
            warn!(%err, "could not restore the initial view");
        }
    }
    views
}

fn write_mount(out: &mut String, views: &[View], shown: Option<&str>) {
    out.push_str("<main id=\"treemap-root\">\n");
    for view in views {
        let hidden = if Some(view.value.as_str()) == shown { "" } else { " hidden" };
        writeln!(
            out,
            "    <div class=\"treemap-view\" data-view=\"{}\" data-total=\"{}\" data-wasted=\"{}\"{hidden}>",
            escape_html(&view.value),
            format_bytes(view.total),
            format_bytes(view.wasted),
        ).unwrap();
        out.push_str(&view.markup);
        out.push_str("    </div>\n");
    }
    out.push_str("</main>\n");
}

/// Generate the treemap HTML document for `page`.
///
/// Every selector entry is rendered once so the page can switch views
/// offline; `page` is left showing the entry it was on.
pub fn render_page(page: &mut Page, title: &str) -> String {
    let views = capture_views(page);
    let page = &*page;
    let doc = page.document();
    let shown = doc.select_value(page.selector());
    let current = page.viewer().and_then(|v| v.current_root_node());
    let (total, wasted) = current.map_or((0.0, 0.0), |n| (n.size, n.wasted_bytes));
    let viewport = doc.viewport();

    let mut html = String::with_capacity(64 * 1024);

    write!(html, r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
* {{
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}}

body {{
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: linear-gradient(180deg, #0c0f1a 0%, #151928 100%);
    color: #e2e8f0;
    min-height: 100vh;
    padding: 24px;
}}

header {{
    display: flex;
    align-items: center;
    gap: 16px;
    margin-bottom: 16px;
}}

select {{
    background: rgba(255, 255, 255, 0.05);
    border: 1px solid rgba(255, 255, 255, 0.1);
    border-radius: 8px;
    padding: 10px 16px;
    font-size: 0.875rem;
    color: #e2e8f0;
    outline: none;
}}

.stats {{
    display: flex;
    gap: 24px;
    margin-bottom: 16px;
}}

.stat-label {{
    font-size: 0.75rem;
    color: #64748b;
    text-transform: uppercase;
    letter-spacing: 0.05em;
}}

.stat-value {{
    font-size: 0.9375rem;
    font-weight: 500;
    font-variant-numeric: tabular-nums;
}}

main {{
    position: relative;
    width: {width}px;
    height: {height}px;
    overflow: hidden;
    border-radius: 12px;
}}

.treemap-view {{
    position: absolute;
    inset: 0;
}}

.treemap-view[hidden] {{
    display: none;
}}

.treemap-node {{
    position: absolute;
    overflow: hidden;
    border: 1px solid rgba(0, 0, 0, 0.25);
    cursor: pointer;
}}

.treemap-node--hover {{
    filter: brightness(1.15);
    border-color: rgba(255, 255, 255, 0.6);
}}

.treemap-caption {{
    height: 18px;
    padding: 0 4px;
    font-size: 11px;
    line-height: 18px;
    font-family: 'SF Mono', 'Fira Code', 'JetBrains Mono', Consolas, monospace;
    white-space: nowrap;
    text-overflow: ellipsis;
    overflow: hidden;
}}
</style>
</head>
<body>
<h1 class="title">{title}</h1>
<div class="stats">
    <div class="stat">
        <span class="stat-label">Total Bytes</span>
        <span class="stat-value" id="totalBytes">{total}</span>
    </div>
    <div class="stat">
        <span class="stat-label">Wasted Bytes</span>
        <span class="stat-value" id="wastedBytes">{wasted}</span>
    </div>
</div>
"##,
        title = escape_html(title),
        width = viewport.width,
        height = viewport.height,
        total = format_bytes(total),
        wasted = format_bytes(wasted),
    ).unwrap();

    for &child in doc.get(doc.body()).map(|b| b.children()).unwrap_or_default() {
        if child == page.mount() {
            write_mount(&mut html, &views, shown);
        } else {
            write_element(&mut html, doc, child, 0);
        }
    }

    html.push_str(r##"<script>
(function() {
    const selector = document.getElementById('bundle-selector');
    const views = Array.from(document.querySelectorAll('.treemap-view'));
    const totalBytes = document.getElementById('totalBytes');
    const wastedBytes = document.getElementById('wastedBytes');

    selector.addEventListener('change', function() {
        views.forEach(function(view) {
            const active = view.dataset.view === selector.value;
            view.hidden = !active;
            if (active) {
                totalBytes.textContent = view.dataset.total;
                wastedBytes.textContent = view.dataset.wasted;
            }
        });
    });

    function nodeOf(target) {
        return target.closest ? target.closest('.treemap-node') : null;
    }
    window.addEventListener('mouseover', function(e) {
        const node = nodeOf(e.target);
        if (node) node.classList.add('treemap-node--hover');
    });
    window.addEventListener('mouseout', function(e) {
        const node = nodeOf(e.target);
        if (node) node.classList.remove('treemap-node--hover');
    });
})();
</script>
</body>
</html>
"##);

    html
}

/// Generate the page written in place of a treemap when the payload at
/// `payload` could not be shown.
pub fn render_error_page(payload: &str, err: &Error) -> String {
    let mut html = String::with_capacity(2048);
    write!(html, r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Treemap unavailable</title>
<style>
body {{
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: linear-gradient(180deg, #0c0f1a 0%, #151928 100%);
    color: #e2e8f0;
    min-height: 100vh;
    padding: 48px 24px;
}}
.notice {{
    max-width: 640px;
    margin: 0 auto;
    padding: 24px 28px;
    border-left: 4px solid #f59e0b;
    background: rgba(245, 158, 11, 0.08);
    border-radius: 8px;
}}
.notice h1 {{
    font-size: 1.125rem;
    font-weight: 600;
    margin-bottom: 16px;
}}
.notice dl {{
    display: grid;
    grid-template-columns: max-content auto;
    gap: 6px 16px;
    font-size: 0.8125rem;
}}
.notice dt {{
    color: #64748b;
}}
.notice dd {{
    font-family: 'SF Mono', 'Fira Code', Consolas, monospace;
    word-break: break-all;
}}
</style>
</head>
<body>
<div class="notice">
    <h1>No treemap was rendered</h1>
    <dl>
        <dt>Payload</dt>
        <dd>{payload}</dd>
"##, payload = escape_html(payload)).unwrap();

    if let Error::UnknownRoot { id } = err {
        writeln!(html, "        <dt>Selected id</dt>\n        <dd>{}</dd>", escape_html(id)).unwrap();
    }
    write!(html, r##"        <dt>Reason</dt>
        <dd>{reason}</dd>
    </dl>
</div>
</body>
</html>
"##, reason = escape_html(&err.to_string())).unwrap();

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Size;
    use crate::host::{HostLink, MessageEvent, WindowId};
    use crate::page::{Event, build_document};
    use crate::viewer::ViewerConfig;
    use serde_json::json;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_bytes(0.0), "0");
        assert_eq!(format_bytes(999.0), "999");
        assert_eq!(format_bytes(1234.4), "1,234");
        assert_eq!(format_bytes(1234567.0), "1,234,567");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn page_contains_rendered_nodes() {
        let (host, _inbox) = HostLink::opened_by(WindowId(1));
        let doc = build_document(Size { width: 640.0, height: 480.0 });
        let mut page = Page::load(doc, host, ViewerConfig::default()).unwrap();
        page.dispatch(Event::Message(MessageEvent {
            source: WindowId(1),
            data: json!({
                "documentUrl": "https://x/?a=1&b=2",
                "id": "a.js",
                "rootNodes": [{"id": "a.js", "group": "javascript", "node": {"size": 1500, "wastedBytes": 600}}]
            }),
        }))
        .unwrap();

        let html = render_page(&mut page, "Treemap <x>");
        assert!(html.contains("<title>Treemap &lt;x&gt;</title>"));
        assert!(html.contains("https://x/?a=1&amp;b=2 (all javascript)"));
        assert!(html.contains("<option selected value=\"a.js\">a.js</option>"));
        assert!(html.contains("a.js • 1500 • 40"));
        assert!(html.contains("background-color:hsl("));
        assert!(html.contains("<span class=\"stat-value\" id=\"totalBytes\">1,500</span>"));
        assert!(html.contains("width: 640px;"));
    }

    #[test]
    fn every_selector_entry_gets_a_view() {
        let (host, _inbox) = HostLink::opened_by(WindowId(1));
        let doc = build_document(Size { width: 640.0, height: 480.0 });
        let mut page = Page::load(doc, host, ViewerConfig::default()).unwrap();
        page.dispatch(Event::Message(MessageEvent {
            source: WindowId(1),
            data: json!({
                "documentUrl": "https://x",
                "id": "b.js",
                "rootNodes": [
                    {"id": "a.js", "group": "javascript", "node": {"size": 100, "wastedBytes": 40}},
                    {"id": "b.js", "group": "javascript", "node": {"size": 200, "wastedBytes": 50}}
                ]
            }),
        }))
        .unwrap();

        let html = render_page(&mut page, "Treemap");
        assert!(html.contains(r#"data-view="javascript" data-total="300" data-wasted="90" hidden>"#));
        assert!(html.contains(r#"data-view="a.js" data-total="100" data-wasted="40" hidden>"#));
        assert!(html.contains(r#"data-view="b.js" data-total="200" data-wasted="50">"#));
        assert_eq!(html.matches("class=\"treemap-view\"").count(), 3);
        assert!(html.contains("https://x • 300 • 30"));
        assert!(html.contains("a.js • 100 • 40"));
        assert!(html.contains("selector.addEventListener('change'"));

        // The page is back on the initial entry.
        assert_eq!(page.document().select_value(page.selector()), Some("b.js"));
        let current = page.viewer().unwrap().current_root_node().unwrap();
        assert_eq!(current.label_source(), "b.js");
    }

    #[test]
    fn error_page_names_payload_and_id() {
        let err = Error::UnknownRoot { id: "<nope>.js".into() };
        let html = render_error_page("bundles/p.json", &err);
        assert!(html.contains("<dd>bundles/p.json</dd>"));
        assert!(html.contains("<dt>Selected id</dt>\n        <dd>&lt;nope&gt;.js</dd>"));
        assert!(html.contains("no root node with id &quot;&lt;nope&gt;.js&quot;"));

        let html = render_error_page("-", &Error::NoViewer);
        assert!(!html.contains("Selected id"));
        assert!(html.contains("no treemap data was received from the opener"));
    }
}
