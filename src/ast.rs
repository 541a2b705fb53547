// Core data model: tagged container/leaf variants, the open-container
// stack, and the final Blocks AST. Direct sum types, no inheritance,
// matching the teacher's `parser::ast` module.

use crate::inline::Inlines;
use crate::scanners::Delim;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet(char),
    Numbered(Delim, u32),
}

impl ListType {
    /// Two list items belong to the same list iff their list_types match
    /// by constructor and discriminating field (start numbers may
    /// differ for `Numbered`).
    pub fn joins_with(&self, other: &ListType) -> bool {
        match (self, other) {
            (ListType::Bullet(a), ListType::Bullet(b)) => a == b,
            (ListType::Numbered(da, _), ListType::Numbered(db, _)) => da == db,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    Document,
    BlockQuote,
    ListItem {
        marker_column: u32,
        padding: u32,
        list_type: ListType,
    },
    FencedCode {
        start_column: u32,
        fence: String,
        info: String,
    },
    IndentedCode,
    RawHtmlBlock,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    TextLine(String),
    BlankLine(String),
    ATXHeader(u8, String),
    SetextHeader(u8, String),
    Rule,
}

#[derive(Debug, Clone)]
pub enum Element {
    Container(Container),
    Leaf(u32, Leaf),
}

impl Element {
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Element::Leaf(_, leaf) => Some(leaf),
            Element::Container(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub kind: ContainerKind,
    pub children: Vec<Element>,
}

impl Container {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn last_child_is_text_line(&self) -> bool {
        matches!(
            self.children.last(),
            Some(Element::Leaf(_, Leaf::TextLine(_)))
        )
    }

    pub fn last_child_is_blank_line(&self) -> bool {
        matches!(
            self.children.last(),
            Some(Element::Leaf(_, Leaf::BlankLine(_)))
        )
    }
}

/// Non-empty stack; bottom is always `Document`.
#[derive(Debug, Clone)]
pub struct ContainerStack {
    frames: Vec<Container>,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Container::new(ContainerKind::Document)],
        }
    }

    pub fn push(&mut self, kind: ContainerKind) {
        self.frames.push(Container::new(kind));
    }

    /// Pop the top container off the stack without attaching it anywhere.
    /// Callers run close semantics (reference parsing, list-item
    /// blank-line hoisting) and then call `attach_to_top` themselves, or
    /// drop the container silently.
    pub fn pop(&mut self) -> Container {
        self.frames
            .pop()
            .expect("stack must always have at least Document at the bottom")
    }

    pub fn attach_to_top(&mut self, container: Container) {
        self.top_mut().children.push(Element::Container(container));
    }

    pub fn top(&self) -> &Container {
        self.frames.last().expect("stack is never empty")
    }

    /// The kind of the container at `idx` frames from the bottom
    /// (`Document` is always `0`).
    pub fn kind_at(&self, idx: usize) -> &ContainerKind {
        &self.frames[idx].kind
    }

    pub fn top_mut(&mut self) -> &mut Container {
        self.frames.last_mut().expect("stack is never empty")
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_at_document_only(&self) -> bool {
        self.frames.len() == 1
    }

    /// Consume the stack once only `Document` remains, returning its
    /// children. Panics if called while other containers are still open
    /// (callers must close them first).
    pub fn into_document_children(mut self) -> Vec<Element> {
        assert_eq!(self.frames.len(), 1, "document must be the only open frame");
        self.frames.pop().expect("document frame").children
    }
}

impl Default for ContainerStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Join the text of consecutive `TextLine`/`BlankLine` leaves with `\n`,
/// ignoring any other element kind. Shared by `Reference` close handling
/// and the `FencedCode`/`RawHtmlBlock` transform steps.
pub fn join_text_children(children: &[Element]) -> String {
    children
        .iter()
        .filter_map(|element| match element {
            Element::Leaf(_, Leaf::TextLine(text)) => Some(text.as_str()),
            Element::Leaf(_, Leaf::BlankLine(text)) => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttr(pub Option<String>);

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Para(Inlines),
    Header(u8, Inlines),
    Blockquote(Blocks),
    List {
        tight: bool,
        list_type: ListType,
        items: Vec<Blocks>,
    },
    CodeBlock(CodeAttr, String),
    HtmlBlock(String),
    HRule,
}

pub type Blocks = Vec<Block>;
