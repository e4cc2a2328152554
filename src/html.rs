//! Minimal markup assembly for status and listing pages.

/// Title of every generated page.
pub const PAGE_TITLE: &str = "Web server";

/// Wraps `content` in a complete HTML document.
pub fn render(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\r\n<html>\r\n<head>\r\n<meta charset=\"utf-8\">\r\n<title>{}</title>\r\n</head>\r\n<body>\r\n{}</body>\r\n</html>\r\n",
        escape(title),
        content
    )
}

pub fn heading(text: &str) -> String {
    format!("<h1>{}</h1>\r\n", escape(text))
}

pub fn paragraph(text: &str) -> String {
    format!("<div>{}</div>\r\n", escape(text))
}

/// `href` must already be URL-encoded; `text` is escaped here.
pub fn anchor(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

/// Builds a table. Header cells are escaped; row cells are inserted as markup.
pub fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from("<table>\r\n<tr>");
    for cell in header {
        out.push_str("<th>");
        out.push_str(&escape(cell));
        out.push_str("</th>");
    }
    out.push_str("</tr>\r\n");

    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>\r\n");
    }

    out.push_str("</table>\r\n");
    out
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
