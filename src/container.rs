// The container recogniser and tree builder: `continue_line`,
// `try_new_containers`, and the stateful `Builder::process_line` that
// drives the open-container stack line by line. This is the core of the
// crate; everything else is a collaborator it calls into.

use crate::ast::{join_text_children, Container, ContainerKind, ContainerStack, Element, Leaf, ListType};
use crate::line::Line;
use crate::refmap::ReferenceMap;
use crate::scanners::{
    leading_spaces, list_marker_padding, parse_atx_header_start, parse_code_fence,
    parse_html_block_start, parse_link_reference_definition, parse_list_marker,
    parse_setext_header_line, scan_blank_line, scan_blockquote_start, scan_hrule_line,
    scan_indent_space, scan_nonindent_space, scan_reference, scan_spaces_to_column,
    ListMarkerKind,
};

/// Walk the open-container stack outermost-in, applying each container's
/// continuation rule against `line_text`. Returns the unconsumed suffix
/// and the count of deepest containers that failed to continue.
pub fn continue_line<'a>(stack: &ContainerStack, line_text: &'a str) -> (&'a str, usize) {
    let depth = stack.depth();
    let mut remainder = line_text;
    let mut column: u32 = 1;
    let mut matched = 0usize;

    for idx in 0..depth {
        let kind = stack.kind_at(idx);
        let ok = match kind {
            ContainerKind::Document => true,
            ContainerKind::BlockQuote => {
                let (_, after_nonindent) = scan_nonindent_space(remainder);
                match scan_blockquote_start(after_nonindent) {
                    Some(after) => {
                        column += (remainder.len() - after.len()) as u32;
                        remainder = after;
                        true
                    }
                    None => false,
                }
            }
            ContainerKind::IndentedCode => match scan_indent_space(remainder) {
                Some(after) => {
                    column += 4;
                    remainder = after;
                    true
                }
                None => false,
            },
            ContainerKind::FencedCode { start_column, .. } => {
                let after = scan_spaces_to_column(remainder, column, *start_column);
                column += (remainder.len() - after.len()) as u32;
                remainder = after;
                true
            }
            ContainerKind::RawHtmlBlock => !scan_blank_line(remainder),
            ContainerKind::ListItem {
                marker_column,
                padding,
                ..
            } => {
                if scan_blank_line(remainder) {
                    true
                } else {
                    let content_column = marker_column + padding;
                    if column >= content_column {
                        true
                    } else {
                        let needed = (content_column - column) as usize;
                        if leading_spaces(remainder) >= needed {
                            remainder = &remainder[needed..];
                            column = content_column;
                            true
                        } else {
                            false
                        }
                    }
                }
            }
            ContainerKind::Reference => !scan_blank_line(remainder) && !scan_reference(remainder),
        };

        if ok {
            matched += 1;
        } else {
            break;
        }
    }

    (remainder, depth - matched)
}

/// Recursion/nesting cap mirroring the teacher's `parse_blocks_internal`
/// guard: bounds how deep a single line's run of blockquote/list-item
/// openers can push the stack, so a pathological run of `>` markers can't
/// grow the container stack without bound.
const MAX_DEPTH: usize = 100;

fn recognize_regular_containers<'a>(
    column: &mut u32,
    mut remainder: &'a str,
    new_kinds: &mut Vec<ContainerKind>,
    existing_depth: usize,
) -> &'a str {
    loop {
        if existing_depth + new_kinds.len() >= MAX_DEPTH {
            log::warn!("container nesting depth limit reached; not opening further containers");
            return remainder;
        }

        let (_, after_nonindent) = scan_nonindent_space(remainder);
        let nonindent_consumed = (remainder.len() - after_nonindent.len()) as u32;

        if let Some(after_bq) = scan_blockquote_start(after_nonindent) {
            let consumed = (after_nonindent.len() - after_bq.len()) as u32;
            *column += nonindent_consumed + consumed;
            remainder = after_bq;
            new_kinds.push(ContainerKind::BlockQuote);
            continue;
        }

        if let Some((marker_kind, marker_col_rel, width)) = parse_list_marker(after_nonindent) {
            let off = (marker_col_rel - 1) as usize;
            let marker_column = *column + nonindent_consumed + off as u32;
            let after_marker_text = &after_nonindent[(off + width as usize).min(after_nonindent.len())..];
            let padding = list_marker_padding(after_marker_text, width);
            let list_type = match marker_kind {
                ListMarkerKind::Bullet(c) => ListType::Bullet(c),
                ListMarkerKind::Numbered(delim, n) => ListType::Numbered(delim, n),
            };
            new_kinds.push(ContainerKind::ListItem {
                marker_column,
                padding,
                list_type,
            });
            let consume = (off + padding as usize).min(after_nonindent.len());
            remainder = &after_nonindent[consume..];
            *column = marker_column + padding;
            continue;
        }

        return remainder;
    }
}

/// Strip the ATX header's trailing run of `#`s and spaces, unless the run
/// is immediately preceded by an escaping backslash (`\#`), in which case
/// it is left literal.
fn strip_atx_closing_sequence(text: &str) -> String {
    let trimmed = text.trim_end_matches(' ');
    let hash_count = trimmed.chars().rev().take_while(|&c| c == '#').count();
    if hash_count == 0 {
        return trimmed.to_string();
    }
    let before_hashes = &trimmed[..trimmed.len() - hash_count];
    if before_hashes.ends_with('\\') {
        return trimmed.to_string();
    }
    before_hashes.trim_end_matches(' ').to_string()
}

/// Recognise zero or more new containers at the current position, then
/// recognise the leaf that terminates the line.
pub fn try_new_containers(
    last_line_is_text: bool,
    column: u32,
    remainder: &str,
    existing_depth: usize,
) -> (Vec<ContainerKind>, Leaf) {
    let mut new_kinds = Vec::new();
    let mut column = column;
    let remainder = recognize_regular_containers(&mut column, remainder, &mut new_kinds, existing_depth);
    let mut remainder = remainder;

    let mut opened_verbatim = false;
    if let Some((fence, info, rel_col)) = parse_code_fence(remainder) {
        let start_column = column + rel_col - 1;
        new_kinds.push(ContainerKind::FencedCode {
            start_column,
            fence,
            info,
        });
        remainder = "";
        opened_verbatim = true;
    } else if !last_line_is_text {
        if let Some(after) = scan_indent_space(remainder).filter(|a| !scan_blank_line(a)) {
            new_kinds.push(ContainerKind::IndentedCode);
            remainder = after;
            opened_verbatim = true;
        } else if parse_html_block_start(remainder) {
            new_kinds.push(ContainerKind::RawHtmlBlock);
            opened_verbatim = true;
        } else if scan_reference(remainder) {
            new_kinds.push(ContainerKind::Reference);
            opened_verbatim = true;
        }
    }

    let leaf = if opened_verbatim {
        if scan_blank_line(remainder) {
            Leaf::BlankLine(remainder.to_string())
        } else {
            Leaf::TextLine(remainder.to_string())
        }
    } else if let Some((level, text)) = parse_atx_header_start(remainder) {
        Leaf::ATXHeader(level, strip_atx_closing_sequence(text))
    } else if last_line_is_text && new_kinds.is_empty() {
        if let Some(level) = parse_setext_header_line(remainder) {
            Leaf::SetextHeader(level, String::new())
        } else {
            leaf_from_rule_text_or_blank(remainder)
        }
    } else {
        leaf_from_rule_text_or_blank(remainder)
    };

    (new_kinds, leaf)
}

fn leaf_from_rule_text_or_blank(remainder: &str) -> Leaf {
    if scan_hrule_line(remainder) {
        Leaf::Rule
    } else if scan_blank_line(remainder) {
        Leaf::BlankLine(remainder.to_string())
    } else {
        Leaf::TextLine(remainder.to_string())
    }
}

/// A fenced code closer must use the same character as the opener and be
/// at least as long; the rest of the line must be blank.
fn fence_closes(remainder: &str, fence: &str) -> bool {
    let Some(fence_char) = fence.chars().next() else {
        return false;
    };
    let trimmed = remainder.trim_start_matches(' ');
    if remainder.len() - trimmed.len() > 3 {
        return false;
    }
    let run_len = trimmed.chars().take_while(|&c| c == fence_char).count();
    if run_len < fence.chars().count() {
        return false;
    }
    trimmed[run_len..].chars().all(|c| c == ' ')
}

/// Drives the container stack across a whole document, one line at a
/// time, accumulating the reference map as a side effect.
pub struct Builder {
    stack: ContainerStack,
    refmap: ReferenceMap,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            stack: ContainerStack::new(),
            refmap: ReferenceMap::new(),
        }
    }

    pub fn process_line(&mut self, line: &Line) {
        let (remainder, num_unmatched) = continue_line(&self.stack, &line.text);
        let last_line_is_text = num_unmatched == 0 && self.stack.top().last_child_is_text_line();
        let top_kind = self.stack.top().kind.clone();

        match top_kind {
            ContainerKind::RawHtmlBlock | ContainerKind::IndentedCode if num_unmatched == 0 => {
                self.add_leaf(line.line_number, Leaf::TextLine(remainder.to_string()));
            }
            ContainerKind::FencedCode { fence, .. } => {
                if fence_closes(remainder, &fence) {
                    self.close_top();
                } else {
                    self.add_leaf(line.line_number, Leaf::TextLine(remainder.to_string()));
                }
            }
            _ => {
                let column = (line.text.len() - remainder.len()) as u32 + 1;
                let (new_kinds, leaf) =
                    try_new_containers(last_line_is_text, column, remainder, self.stack.depth());

                if new_kinds.is_empty() {
                    match &leaf {
                        Leaf::TextLine(_) => {
                            let lazy = self.stack.top().last_child_is_text_line()
                                && !matches!(self.stack.top().kind, ContainerKind::IndentedCode);
                            if !lazy {
                                self.close_n(num_unmatched);
                            }
                            self.add_leaf(line.line_number, leaf);
                        }
                        Leaf::SetextHeader(level, _) if num_unmatched == 0 => {
                            self.promote_to_setext(line.line_number, *level);
                        }
                        _ => {
                            self.close_n(num_unmatched);
                            self.add_leaf(line.line_number, leaf);
                        }
                    }
                } else {
                    self.close_n(num_unmatched);
                    for kind in new_kinds {
                        self.stack.push(kind);
                    }
                    let innermost_is_fenced =
                        matches!(self.stack.top().kind, ContainerKind::FencedCode { .. });
                    if !(matches!(leaf, Leaf::BlankLine(_)) && innermost_is_fenced) {
                        self.add_leaf(line.line_number, leaf);
                    }
                }
            }
        }
    }

    fn add_leaf(&mut self, line_number: u32, leaf: Leaf) {
        let list_item_trailing_blank = matches!(leaf, Leaf::BlankLine(_))
            && matches!(self.stack.top().kind, ContainerKind::ListItem { .. })
            && self.stack.top().last_child_is_blank_line();
        if list_item_trailing_blank {
            self.close_top();
            self.add_leaf(line_number, leaf);
            return;
        }
        self.stack.top_mut().children.push(Element::Leaf(line_number, leaf));
    }

    fn close_n(&mut self, n: usize) {
        for _ in 0..n {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        let mut closed = self.stack.pop();
        match &closed.kind {
            ContainerKind::Reference => {
                let text = join_text_children(&closed.children);
                if let Some((label, url, title)) = parse_link_reference_definition(&text) {
                    self.refmap.insert(&label, url, title);
                }
                // Parse failure: silently dropped, neither attached nor recorded.
            }
            ContainerKind::ListItem { .. } => {
                if closed.last_child_is_blank_line() {
                    let blank = closed.children.pop().expect("checked non-empty above");
                    self.stack.attach_to_top(closed);
                    self.stack.top_mut().children.push(blank);
                } else {
                    self.stack.attach_to_top(closed);
                }
            }
            _ => {
                self.stack.attach_to_top(closed);
            }
        }
    }

    fn promote_to_setext(&mut self, line_number: u32, level: u8) {
        let top = self.stack.top_mut();
        match top.children.last().cloned() {
            Some(Element::Leaf(_, Leaf::TextLine(text))) => {
                let idx = top.children.len() - 1;
                top.children[idx] = Element::Leaf(line_number, Leaf::SetextHeader(level, text));
            }
            _ => {
                log::warn!(
                    "setext promotion at line {} had no preceding text line; ignoring",
                    line_number
                );
            }
        }
    }

    /// Close remaining containers until only `Document` remains, and
    /// return its children plus the accumulated reference map.
    pub fn finish(mut self) -> (Vec<Element>, ReferenceMap) {
        while !self.stack.is_at_document_only() {
            self.close_top();
        }
        (self.stack.into_document_children(), self.refmap)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a container tree from preprocessed lines.
pub fn build(lines: &[Line]) -> (Vec<Element>, ReferenceMap) {
    let mut builder = Builder::new();
    for line in lines {
        builder.process_line(line);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::split_lines;

    fn build_children(text: &str) -> (Vec<Element>, ReferenceMap) {
        build(&split_lines(text))
    }

    #[test]
    fn smoke_test_paragraph_single_line() {
        let (children, _) = build_children("hello\n");
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0], Element::Leaf(1, Leaf::TextLine(_))));
    }

    #[test]
    fn smoke_test_blockquote_lazy_continuation() {
        let (children, _) = build_children("> a\nb\n");
        assert_eq!(children.len(), 1);
        match &children[0] {
            Element::Container(container) => {
                assert_eq!(container.kind, ContainerKind::BlockQuote);
                assert_eq!(container.children.len(), 2);
            }
            _ => panic!("expected a blockquote container"),
        }
    }

    #[test]
    fn smoke_test_atx_header() {
        let (children, _) = build_children("# Hello\n");
        match &children[0] {
            Element::Leaf(1, Leaf::ATXHeader(level, text)) => {
                assert_eq!(*level, 1);
                assert_eq!(text, "Hello");
            }
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn smoke_test_setext_promotes_preceding_text_line() {
        let (children, _) = build_children("foo\n===\n");
        assert_eq!(children.len(), 1);
        match &children[0] {
            Element::Leaf(_, Leaf::SetextHeader(level, text)) => {
                assert_eq!(*level, 1);
                assert_eq!(text, "foo");
            }
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn smoke_test_rule_beats_bullet_list() {
        let (children, _) = build_children("- - -\n");
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0], Element::Leaf(1, Leaf::Rule)));
    }

    #[test]
    fn smoke_test_fenced_code_block() {
        let (children, _) = build_children("```rs\nfn main(){}\n```\n");
        match &children[0] {
            Element::Container(container) => match &container.kind {
                ContainerKind::FencedCode { info, .. } => assert_eq!(info, "rs"),
                other => panic!("unexpected kind: {other:?}"),
            },
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn smoke_test_reference_definition_consumed_into_refmap() {
        let (children, refmap) = build_children("[foo]: /url \"t\"\n\n[foo]\n");
        assert!(children.iter().all(|e| !matches!(
            e,
            Element::Container(Container {
                kind: ContainerKind::Reference,
                ..
            })
        )));
        let entry = refmap.get("foo").unwrap();
        assert_eq!(entry.url, "/url");
        assert_eq!(entry.title, Some("t".to_string()));
    }

    #[test]
    fn smoke_test_tight_list_items() {
        let (children, _) = build_children("- x\n- y\n- z\n");
        assert_eq!(children.len(), 3);
        for child in &children {
            assert!(matches!(
                child,
                Element::Container(Container {
                    kind: ContainerKind::ListItem { .. },
                    ..
                })
            ));
        }
    }

    #[test]
    fn smoke_test_loose_list_blank_line_hoisted_as_sibling() {
        let (children, _) = build_children("- x\n\n- y\n");
        // The blank line between items is hoisted out of the first item
        // as a sibling, so Document ends up with: item, blank, item.
        assert_eq!(children.len(), 3);
        assert!(matches!(children[1], Element::Leaf(_, Leaf::BlankLine(_))));
    }

    #[test]
    fn smoke_test_pathological_nesting_does_not_blow_stack() {
        let markers: String = std::iter::repeat('>').take(10_000).collect();
        let text = format!("{markers} hi\n");
        let (children, _) = build_children(&text);
        assert_eq!(children.len(), 1);
    }
}
