// src/utils/csv.rs

/// Quotes a field when it contains a delimiter, quote or line break.
pub fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Renders a header plus rows as CSV text with `\n` line endings.
pub fn to_csv<R, F>(header: &[&str], rows: &[R], fields: F) -> String
where
    F: Fn(&R) -> Vec<String>,
{
    let mut csv = String::new();
    csv.push_str(
        &header
            .iter()
            .map(|h| csv_escape(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    csv.push('\n');

    for row in rows {
        let line = fields(row)
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_to_csv() {
        let rows = vec![("Ada", 3), ("Lovelace, A.", 0)];
        let out = to_csv(&["name", "completed"], &rows, |(n, c)| {
            vec![n.to_string(), c.to_string()]
        });
        assert_eq!(out, "name,completed\nAda,3\n\"Lovelace, A.\",0\n");
    }
}
