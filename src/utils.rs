use unicode_width::UnicodeWidthChar;

/// Cuts `s` to at most `max_width` terminal columns, ending in "..." when
/// anything was dropped.
pub fn truncate_string(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }
    if max_width < 3 {
        return ".".repeat(max_width);
    }

    let budget = max_width - 3;
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Collapses newlines and runs of whitespace so free text fits in a table cell.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text gauge such as `[#######---] 0.70`. Out-of-range values are drawn
/// clamped but printed as-is.
pub fn confidence_bar(confidence: f64, width: usize) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:.2}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        confidence
    )
}
