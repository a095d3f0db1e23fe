use std::fmt::Write;

use super::{language_label, Outline};

pub(super) fn write(outline: &Outline<'_>) -> String {
    let project = outline.project;
    let mut out = String::new();

    // fmt::Write on String is infallible.
    let _ = writeln!(out, "# {} Documentation Passport", project.name);
    out.push('\n');
    let _ = writeln!(out, "- **Generated:** {}", outline.timestamp());
    let _ = writeln!(out, "- **Repository:** {}", project.repository_url);
    let _ = writeln!(out, "- **Branch:** {}", project.branch);
    let _ = writeln!(out, "- **Organization:** {}", project.organization_id);
    if let Some(description) = &project.description {
        let _ = writeln!(out, "- **Description:** {}", description);
    }

    out.push_str("\n## Statistics\n\n");
    let _ = writeln!(out, "- Total specs: {}", outline.sections.len());
    let _ = writeln!(out, "- Total lines: {}", outline.total_lines);
    let _ = writeln!(out, "- Total size: {} bytes", outline.total_size);
    if !outline.languages.is_empty() {
        let breakdown: Vec<String> = outline
            .languages
            .iter()
            .map(|(language, count)| format!("{} ({})", language, count))
            .collect();
        let _ = writeln!(out, "- Languages: {}", breakdown.join(", "));
    }

    out.push_str("\n## Files\n\n");
    if outline.sections.is_empty() {
        out.push_str("_No specs have been captured for this project._\n");
    }
    for section in &outline.sections {
        let spec = section.spec;
        let _ = writeln!(
            out,
            "- `{}` ({}, {} lines, {} bytes)",
            spec.file_path,
            language_label(spec),
            spec.line_count,
            spec.size_in_bytes
        );
    }

    if !outline.sections.is_empty() {
        out.push_str("\n## Specs\n");
    }
    for section in &outline.sections {
        let spec = section.spec;
        let _ = writeln!(out, "\n### {}\n", spec.file_path);
        let _ = writeln!(out, "- Language: {}", language_label(spec));
        let _ = writeln!(out, "- Lines: {}", spec.line_count);
        let _ = writeln!(out, "- Size: {} bytes", spec.size_in_bytes);
        out.push('\n');

        let fence = fence_for(section.excerpt);
        let _ = writeln!(out, "{}{}", fence, spec.language.trim());
        out.push_str(section.excerpt);
        if !section.excerpt.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", fence);
        if section.omitted_chars > 0 {
            let _ = writeln!(
                out,
                "\n_... (truncated, {} more characters)_",
                section.omitted_chars
            );
        }
    }

    out
}

/// A backtick fence longer than any backtick run inside `body`.
fn fence_for(body: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in body.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_grows_past_embedded_fences() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("```rust\n```"), "````");
        assert_eq!(fence_for("`````"), "``````");
    }
}
