// Line preprocessor: tab expansion and 1-based line numbering. Out of scope
// for the block structure recogniser proper, but needed to drive it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub line_number: u32,
    pub text: String,
}

/// Split `text` into 1-based numbered lines on `\n`, stripping a trailing
/// `\r` from each line and expanding tabs to the next multiple of 4
/// columns. A trailing missing newline on the final line is tolerated: it
/// does not produce a synthetic empty line.
pub fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line_number = 0u32;
    let mut rest = text;
    loop {
        match rest.find('\n') {
            Some(idx) => {
                let raw = &rest[..idx];
                line_number += 1;
                lines.push(Line {
                    line_number,
                    text: expand_tabs(strip_cr(raw)),
                });
                rest = &rest[idx + 1..];
            }
            None => {
                if !rest.is_empty() {
                    line_number += 1;
                    lines.push(Line {
                        line_number,
                        text: expand_tabs(strip_cr(rest)),
                    });
                }
                break;
            }
        }
    }
    lines
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Expand tabs to the next multiple of 4 columns, tracking column position
/// left to right so a tab's width depends on what precedes it.
fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let spaces = 4 - (column % 4);
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_split_basic() {
        let lines = split_lines("a\nb\nc\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], Line { line_number: 1, text: "a".to_string() });
        assert_eq!(lines[2], Line { line_number: 3, text: "c".to_string() });
    }

    #[test]
    fn smoke_test_missing_trailing_newline_tolerated() {
        let lines = split_lines("a\nb");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "b");
    }

    #[test]
    fn smoke_test_strips_carriage_return() {
        let lines = split_lines("a\r\nb\r\n");
        assert_eq!(lines[0].text, "a");
        assert_eq!(lines[1].text, "b");
    }

    #[test]
    fn smoke_test_expands_tab_to_next_stop() {
        let lines = split_lines("\tfoo\n");
        assert_eq!(lines[0].text, "    foo");
    }

    #[test]
    fn smoke_test_tab_width_depends_on_preceding_column() {
        let lines = split_lines("ab\tc\n");
        // "ab" occupies columns 0-1; tab advances to column 4.
        assert_eq!(lines[0].text, "ab  c");
    }
}
