// Low-level, stateless line scanners: the primitive recognisers the
// container recogniser (`container` module) builds on. Most operate on
// plain `&str` since column bookkeeping is already carried by the caller;
// the ones that most directly mirror the teacher's single-shot grammar
// parsers (fence opener, thematic break, list marker, reference
// definition) are implemented with `nom` over `nom_locate::LocatedSpan`,
// matching the teacher's `grammar` module idiom.

use nom::branch::alt;
use nom::bytes::complete::{take_till, take_while, take_while1};
use nom::character::complete::{char as nom_char, line_ending, one_of, space0, space1};
use nom::combinator::{eof, opt, recognize};
use nom::{IResult, Parser};
use nom_locate::LocatedSpan;

pub type Span<'a> = LocatedSpan<&'a str>;

/// Count the leading ASCII spaces in `line`. Tabs are assumed already
/// expanded by the line preprocessor.
pub fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

/// Skip 0-3 leading spaces. Always succeeds; consumes at most 3, leaving
/// the rest (including any 4th+ space) in the remainder.
pub fn scan_nonindent_space(line: &str) -> (usize, &str) {
    let spaces = leading_spaces(line).min(3);
    (spaces, &line[spaces..])
}

/// Require exactly 4 (or more) leading spaces; consumes exactly 4.
pub fn scan_indent_space(line: &str) -> Option<&str> {
    if leading_spaces(line) >= 4 {
        Some(&line[4..])
    } else {
        None
    }
}

/// A line consisting solely of spaces (possibly empty).
pub fn scan_blank_line(line: &str) -> bool {
    line.chars().all(|c| c == ' ')
}

/// `>` optionally followed by one space.
pub fn scan_blockquote_start(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Skip spaces until the current column (1-based, `start_col` is the
/// column of the first character of `line`) reaches at least `target_col`.
pub fn scan_spaces_to_column(line: &str, start_col: u32, target_col: u32) -> &str {
    if target_col <= start_col {
        return line;
    }
    let needed = (target_col - start_col) as usize;
    let available = leading_spaces(line).min(needed);
    &line[available..]
}

/// `#{1,6}` followed by a space or end-of-line. Returns the heading level
/// and the remainder of the line after the marker and one following space
/// (if present).
pub fn parse_atx_header_start(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some((hashes as u8, rest));
    }
    let rest = rest.strip_prefix(' ')?;
    Some((hashes as u8, rest))
}

/// One of `=...` (level 1) or `-...` (level 2), with only spaces
/// permitted after the run of underline characters.
pub fn parse_setext_header_line(line: &str) -> Option<u8> {
    let first = line.chars().next()?;
    let (marker, level) = match first {
        '=' => ('=', 1u8),
        '-' => ('-', 2u8),
        _ => return None,
    };
    let rest = line.trim_start_matches(marker);
    if rest.chars().all(|c| c == ' ') {
        Some(level)
    } else {
        None
    }
}

/// >=3 of the same character among `*`, `_`, `-`, interleaved with
/// optional spaces/tabs, nothing else on the line. Leading 0-3 spaces are
/// allowed and are expected to already be consumed by the caller via
/// `scan_nonindent_space`.
pub fn scan_hrule_line(line: &str) -> bool {
    thematic_break(Span::new(line)).is_ok()
}

fn thematic_break(input: Span) -> IResult<Span, ()> {
    let (input, first_char) = one_of("-*_")(input)?;
    let mut remaining = input;
    let mut count = 1;
    loop {
        let (after_space, _) = take_while(|c| c == ' ' || c == '\t')(remaining)?;
        match nom_char::<_, nom::error::Error<Span>>(first_char)(after_space) {
            Ok((after_char, _)) => {
                count += 1;
                remaining = after_char;
            }
            Err(_) => {
                remaining = after_space;
                break;
            }
        }
    }
    if count < 3 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (remaining, _) = alt((recognize(line_ending), recognize(eof))).parse(remaining)?;
    Ok((remaining, ()))
}

/// A code fence opener: 3+ of `` ` `` or `~` followed by an optional info
/// string. Returns `(fence, info, column)`. `column` is the 1-based
/// column of the fence's first character within `line`.
pub fn parse_code_fence(line: &str) -> Option<(String, String, u32)> {
    let span = Span::new(line);
    let (rest, leading) = take_while::<_, _, nom::error::Error<Span>>(|c| c == ' ')(span).ok()?;
    if leading.fragment().len() > 3 {
        return None;
    }
    let column = leading.fragment().len() as u32 + 1;
    let (rest, fence_char) = one_of::<_, _, nom::error::Error<Span>>("`~")(rest).ok()?;
    let mut count = 1;
    let mut cur = rest;
    loop {
        match nom_char::<_, nom::error::Error<Span>>(fence_char)(cur) {
            Ok((after, _)) => {
                count += 1;
                cur = after;
            }
            Err(_) => break,
        }
    }
    if count < 3 {
        return None;
    }
    let info = cur.fragment().trim();
    if fence_char == '`' && info.contains('`') {
        return None;
    }
    let fence: String = std::iter::repeat(fence_char).take(count).collect();
    Some((fence, info.to_string(), column))
}

const HTML_BLOCK_TAGS: &[&str] = &[
    "article", "header", "aside", "hgroup", "blockquote", "hr", "body", "li", "br", "map",
    "button", "object", "canvas", "ol", "caption", "output", "col", "p", "colgroup", "pre", "dd",
    "progress", "div", "section", "dl", "table", "dt", "tbody", "embed", "textarea", "fieldset",
    "tfoot", "figcaption", "th", "figure", "thead", "footer", "tr", "form", "ul", "h1", "h2", "h3",
    "h4", "h5", "h6", "video",
];

/// Lookahead: either a recognised HTML block-level tag (open or close) or
/// the literal `<!--`/`-->`.
pub fn parse_html_block_start(line: &str) -> bool {
    let trimmed = &line[leading_spaces(line).min(3)..];
    if trimmed.starts_with("<!--") || trimmed.starts_with("-->") {
        return true;
    }
    let Some(after_lt) = trimmed.strip_prefix('<') else {
        return false;
    };
    let after_slash = after_lt.strip_prefix('/').unwrap_or(after_lt);
    let name_end = after_slash
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_slash.len());
    if name_end == 0 {
        return false;
    }
    let name = after_slash[..name_end].to_ascii_lowercase();
    HTML_BLOCK_TAGS.contains(&name.as_str())
}

/// Lookahead for a link label (`[...]`) followed by `:`, without fully
/// validating the destination/title — a cheap recognise-the-start check.
pub fn scan_reference(line: &str) -> bool {
    let trimmed = &line[leading_spaces(line).min(3)..];
    let Some(after_bracket) = trimmed.strip_prefix('[') else {
        return false;
    };
    match after_bracket.find(']') {
        Some(idx) if idx > 0 => after_bracket[idx + 1..].starts_with(':'),
        _ => false,
    }
}

/// Parse a complete `[label]: destination "title"` reference definition
/// out of concatenated reference-container text. Grounded on the
/// teacher's `link_reference_definition` grammar parser.
pub fn parse_link_reference_definition(text: &str) -> Option<(String, String, Option<String>)> {
    fn parse(input: Span) -> IResult<Span, (String, String, Option<String>)> {
        let (input, leading) = take_while(|c| c == ' ')(input)?;
        if leading.fragment().len() > 3 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        let (input, _) = nom_char('[')(input)?;
        let (input, label) = take_till(|c| c == ']' || c == '\n')(input)?;
        if label.fragment().is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        let (input, _) = nom_char(']')(input)?;
        let (input, _) = nom_char(':')(input)?;
        let (input, _) = space0(input)?;
        let (input, _) = opt((line_ending, take_while(|c| c == ' '))).parse(input)?;

        let (input, url_str) = if input.fragment().starts_with('<') {
            let (input, _) = nom_char('<')(input)?;
            let (input, url) = take_till(|c| c == '>' || c == '\n')(input)?;
            let (input, _) = nom_char('>')(input)?;
            (input, url)
        } else {
            take_while1(|c: char| !c.is_whitespace())(input)?
        };
        let url = url_str.fragment().to_string();

        let (input, title) = if let Ok((i, _)) = space1::<Span, nom::error::Error<Span>>(input) {
            let (i, _) = opt((line_ending, take_while(|c| c == ' '))).parse(i)?;
            let (i, title_str) = if i.fragment().starts_with('"') {
                let (i, _) = nom_char('"')(i)?;
                let (i, t) = take_till(|c| c == '"' || c == '\n')(i)?;
                let (i, _) = nom_char('"')(i)?;
                (i, t)
            } else if i.fragment().starts_with('\'') {
                let (i, _) = nom_char('\'')(i)?;
                let (i, t) = take_till(|c| c == '\'' || c == '\n')(i)?;
                let (i, _) = nom_char('\'')(i)?;
                (i, t)
            } else if i.fragment().starts_with('(') {
                let (i, _) = nom_char('(')(i)?;
                let (i, t) = take_till(|c| c == ')' || c == '\n')(i)?;
                let (i, _) = nom_char(')')(i)?;
                (i, t)
            } else {
                return Err(nom::Err::Error(nom::error::Error::new(
                    i,
                    nom::error::ErrorKind::Char,
                )));
            };
            (i, Some(title_str.fragment().to_string()))
        } else {
            (input, None)
        };

        let (input, _) = space0(input)?;
        let (input, _) = if input.fragment().is_empty() {
            (input, ())
        } else {
            line_ending(input).map(|(i, _)| (i, ()))?
        };

        Ok((input, (label.fragment().to_string(), url, title)))
    }

    let normalized = if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    };
    parse(Span::new(&normalized)).ok().map(|(_, v)| v)
}

/// The delimiter following a numbered list marker's digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    PeriodFollowing,
    ParenFollowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarkerKind {
    Bullet(char),
    Numbered(Delim, u32),
}

/// Parse a list marker at the start of `line`. Rejects `*`/`-` markers
/// that are actually thematic breaks. Returns the marker kind, its
/// (1-based) column, and the marker's own width (not including trailing
/// spaces).
pub fn parse_list_marker(line: &str) -> Option<(ListMarkerKind, u32, u32)> {
    let spaces = leading_spaces(line).min(3);
    let after_spaces = &line[spaces..];
    let column = spaces as u32 + 1;

    let mut chars = after_spaces.char_indices();
    let (_, first) = chars.next()?;

    if matches!(first, '+' | '*' | '-') {
        if (first == '*' || first == '-') && scan_hrule_line(after_spaces) {
            return None;
        }
        let after_marker = &after_spaces[first.len_utf8()..];
        if !after_marker.is_empty()
            && !after_marker.starts_with(' ')
            && !after_marker.starts_with('\t')
        {
            return None;
        }
        return Some((ListMarkerKind::Bullet(first), column, 1));
    }

    if first.is_ascii_digit() {
        let digit_end = after_spaces
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_spaces.len());
        if digit_end == 0 || digit_end > 9 {
            return None;
        }
        let number: u32 = after_spaces[..digit_end].parse().ok()?;
        let after_digits = &after_spaces[digit_end..];
        let delim = match after_digits.chars().next() {
            Some('.') => Delim::PeriodFollowing,
            Some(')') => Delim::ParenFollowing,
            _ => return None,
        };
        let after_delim = &after_digits[1..];
        if !after_delim.is_empty() && !after_delim.starts_with(' ') && !after_delim.starts_with('\t')
        {
            return None;
        }
        let marker_width = (digit_end + 1) as u32;
        return Some((ListMarkerKind::Numbered(delim, number), column, marker_width));
    }

    None
}

/// Clamp the amount of trailing padding after a marker per §4.1: 1 if
/// followed by a blank line or by >=4 spaces, otherwise the literal
/// number of trailing spaces present (at least 1).
pub fn list_marker_padding(after_marker: &str, marker_width: u32) -> u32 {
    let trailing_spaces = leading_spaces(after_marker);
    let rest_is_blank = after_marker.trim_start_matches(' ').is_empty();
    let spaces = if rest_is_blank || trailing_spaces >= 4 {
        1
    } else {
        trailing_spaces.max(1)
    };
    marker_width + spaces as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_nonindent_space_clamps_to_three() {
        let (n, rest) = scan_nonindent_space("     x");
        assert_eq!(n, 3);
        assert_eq!(rest, "  x");
    }

    #[test]
    fn smoke_test_indent_space_requires_four() {
        assert_eq!(scan_indent_space("   x"), None);
        assert_eq!(scan_indent_space("    x"), Some("x"));
    }

    #[test]
    fn smoke_test_blank_line() {
        assert!(scan_blank_line("   "));
        assert!(scan_blank_line(""));
        assert!(!scan_blank_line("  x"));
    }

    #[test]
    fn smoke_test_blockquote_start() {
        assert_eq!(scan_blockquote_start("> hi"), Some("hi"));
        assert_eq!(scan_blockquote_start(">hi"), Some("hi"));
        assert_eq!(scan_blockquote_start("hi"), None);
    }

    #[test]
    fn smoke_test_atx_header_start() {
        assert_eq!(parse_atx_header_start("## Title"), Some((2, "Title")));
        assert_eq!(parse_atx_header_start("#"), Some((1, "")));
        assert_eq!(parse_atx_header_start("#No"), None);
        assert_eq!(parse_atx_header_start("####### too many"), None);
    }

    #[test]
    fn smoke_test_setext_header_line() {
        assert_eq!(parse_setext_header_line("==="), Some(1));
        assert_eq!(parse_setext_header_line("---"), Some(2));
        assert_eq!(parse_setext_header_line("--x"), None);
    }

    #[test]
    fn smoke_test_hrule_line() {
        assert!(scan_hrule_line("---"));
        assert!(scan_hrule_line("- - -"));
        assert!(!scan_hrule_line("--"));
        assert!(!scan_hrule_line("-*-"));
    }

    #[test]
    fn smoke_test_code_fence_backticks_with_info() {
        let (fence, info, column) = parse_code_fence("```rust").unwrap();
        assert_eq!(fence, "```");
        assert_eq!(info, "rust");
        assert_eq!(column, 1);
    }

    #[test]
    fn smoke_test_code_fence_rejects_backtick_in_info() {
        assert!(parse_code_fence("```a`b").is_none());
    }

    #[test]
    fn smoke_test_html_block_start_recognised_tag() {
        assert!(parse_html_block_start("<div>"));
        assert!(parse_html_block_start("</div>"));
        assert!(parse_html_block_start("<!-- comment -->"));
        assert!(!parse_html_block_start("<span>"));
    }

    #[test]
    fn smoke_test_reference_lookahead() {
        assert!(scan_reference("[foo]: /url"));
        assert!(!scan_reference("[foo] bar"));
    }

    #[test]
    fn smoke_test_parse_link_reference_definition() {
        let (label, url, title) = parse_link_reference_definition("[foo]: /url \"t\"").unwrap();
        assert_eq!(label, "foo");
        assert_eq!(url, "/url");
        assert_eq!(title, Some("t".to_string()));
    }

    #[test]
    fn smoke_test_list_marker_bullet() {
        let (kind, column, width) = parse_list_marker("- item").unwrap();
        assert_eq!(kind, ListMarkerKind::Bullet('-'));
        assert_eq!(column, 1);
        assert_eq!(width, 1);
    }

    #[test]
    fn smoke_test_list_marker_rejects_hrule() {
        assert!(parse_list_marker("- - -").is_none());
    }

    #[test]
    fn smoke_test_list_marker_numbered() {
        let (kind, _, width) = parse_list_marker("10. item").unwrap();
        assert_eq!(kind, ListMarkerKind::Numbered(Delim::PeriodFollowing, 10));
        assert_eq!(width, 3);
    }

    #[test]
    fn smoke_test_list_marker_padding_clamped_on_blank() {
        assert_eq!(list_marker_padding("", 1), 2);
        assert_eq!(list_marker_padding("     x", 1), 2);
        assert_eq!(list_marker_padding("  x", 1), 3);
    }
}
