/// Quotes a single field, doubling embedded quotes.
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders a header and rows with every field quoted. Rows are joined by
/// `\n`; no BOM and no trailing newline.
pub fn render<I, R, F>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<str>,
{
    let mut lines = vec![header.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",")];
    lines.extend(rows.into_iter().map(|row| {
        row.into_iter()
            .map(|field| quote(field.as_ref()))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal reader for the quoted format produced above.
    fn parse_line(line: &str) -> Vec<String> {
        let mut fields = vec![];
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match (c, quoted) {
                ('"', false) => quoted = true,
                ('"', true) if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                ('"', true) => quoted = false,
                (',', false) => fields.push(std::mem::take(&mut current)),
                (c, _) => current.push(c),
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn every_field_is_quoted() {
        let csv = render(&["Name", "Reason"], vec![vec!["Ayesha", "Device down"]]);
        assert_eq!(csv, "\"Name\",\"Reason\"\n\"Ayesha\",\"Device down\"");
        assert!(!csv.starts_with('\u{feff}'));
    }

    #[test]
    fn quotes_and_commas_survive() {
        let reason = r#"Said "badge broken", again"#;
        let csv = render(&["Reason"], vec![vec![reason.to_string()]]);
        let rows: Vec<&str> = csv.split('\n').collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(parse_line(rows[1]), vec![reason.to_string()]);
    }

    #[test]
    fn header_only_when_no_rows() {
        let rows: Vec<Vec<String>> = vec![];
        assert_eq!(render(&["A", "B"], rows), "\"A\",\"B\"");
    }
}
