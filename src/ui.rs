use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Tables
// ============================================================================

/// Column widths wide enough for the headers and every cell.
fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn pad_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render rows as plain, left-aligned columns.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let widths = column_widths(headers, rows);
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_row(headers, &widths));
    lines.push(pad_row(
        &widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>(),
        &widths,
    ));
    lines.extend(rows.iter().map(|row| pad_row(row, &widths)));
    lines
}

/// Print a table with a bold header line
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut lines = format_table(headers, rows).into_iter();
    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    if let Some(rule) = lines.next() {
        println!("{}", rule.dimmed());
    }
    for line in lines {
        println!("{line}");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_column_widths() {
        let rows = vec![row(&["1", "Alice"]), row(&["1234", "Al"])];
        assert_eq!(column_widths(&["Id", "Name"], &rows), vec![4, 5]);
    }

    #[test]
    fn test_format_table() {
        let rows = vec![row(&["1", "Jones"]), row(&["22", "Li"])];
        let lines = format_table(&["Id", "Last"], &rows);
        assert_eq!(
            lines,
            vec![
                "Id  Last".to_string(),
                "──  ─────".to_string(),
                "1   Jones".to_string(),
                "22  Li".to_string(),
            ]
        );
    }

    #[test]
    fn test_format_table_counts_chars_not_bytes() {
        let rows = vec![row(&["Zoë", "x"])];
        let lines = format_table(&["N", "V"], &rows);
        assert_eq!(lines[2], "Zoë  x");
    }

    #[test]
    fn test_format_table_empty() {
        let lines = format_table(&["Id"], &[]);
        assert_eq!(lines.len(), 2);
    }
}
