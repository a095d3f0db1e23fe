use std::fmt::Write;

use super::{language_label, Outline};

pub(super) fn write(outline: &Outline<'_>) -> String {
    let project = outline.project;
    let name = escape(&project.name);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{} Documentation Passport</title>", name);
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>{} Documentation Passport</h1>", name);

    out.push_str("<ul class=\"project\">\n");
    let _ = writeln!(
        out,
        "<li><strong>Generated:</strong> {}</li>",
        outline.timestamp()
    );
    let _ = writeln!(
        out,
        "<li><strong>Repository:</strong> {}</li>",
        escape(&project.repository_url)
    );
    let _ = writeln!(
        out,
        "<li><strong>Branch:</strong> {}</li>",
        escape(&project.branch)
    );
    let _ = writeln!(
        out,
        "<li><strong>Organization:</strong> {}</li>",
        escape(&project.organization_id)
    );
    if let Some(description) = &project.description {
        let _ = writeln!(
            out,
            "<li><strong>Description:</strong> {}</li>",
            escape(description)
        );
    }
    out.push_str("</ul>\n");

    out.push_str("<h2>Statistics</h2>\n<ul class=\"statistics\">\n");
    let _ = writeln!(out, "<li>Total specs: {}</li>", outline.sections.len());
    let _ = writeln!(out, "<li>Total lines: {}</li>", outline.total_lines);
    let _ = writeln!(out, "<li>Total size: {} bytes</li>", outline.total_size);
    for (language, count) in &outline.languages {
        let _ = writeln!(out, "<li>{}: {}</li>", escape(language), count);
    }
    out.push_str("</ul>\n");

    out.push_str("<h2>Files</h2>\n");
    if outline.sections.is_empty() {
        out.push_str("<p>No specs have been captured for this project.</p>\n");
    } else {
        out.push_str("<ul class=\"files\">\n");
        for section in &outline.sections {
            let spec = section.spec;
            let _ = writeln!(
                out,
                "<li><code>{}</code> ({}, {} lines, {} bytes)</li>",
                escape(&spec.file_path),
                escape(language_label(spec)),
                spec.line_count,
                spec.size_in_bytes
            );
        }
        out.push_str("</ul>\n");
    }

    for section in &outline.sections {
        let spec = section.spec;
        out.push_str("<section class=\"spec\">\n");
        let _ = writeln!(out, "<h3>{}</h3>", escape(&spec.file_path));
        let _ = writeln!(
            out,
            "<p>Language: {} &middot; Lines: {} &middot; Size: {} bytes</p>",
            escape(language_label(spec)),
            spec.line_count,
            spec.size_in_bytes
        );
        let _ = writeln!(out, "<pre><code>{}</code></pre>", escape(section.excerpt));
        if section.omitted_chars > 0 {
            let _ = writeln!(
                out,
                "<p class=\"truncated\">... (truncated, {} more characters)</p>",
                section.omitted_chars
            );
        }
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("a < b && c > \"d\""),
            "a &lt; b &amp;&amp; c &gt; &quot;d&quot;"
        );
        assert_eq!(escape("it's"), "it&#39;s");
        assert_eq!(escape("plain"), "plain");
    }
}
