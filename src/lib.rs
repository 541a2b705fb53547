// blocktree: a CommonMark-flavored block-structure recogniser. Turns a
// Markdown document into a `Blocks` sequence plus a `ReferenceMap`,
// following the container-stack algorithm described in the `container`
// module. Inline parsing (emphasis, links, entities) is intentionally
// reduced; see `inline`.

pub mod ast;
pub mod config;
pub mod container;
pub mod error;
pub mod inline;
pub mod line;
pub mod logger;
pub mod refmap;
pub mod scanners;
pub mod transform;

pub use ast::{Block, Blocks, CodeAttr, ListType};
pub use config::ParserOptions;
pub use error::BlockTreeError;
pub use refmap::ReferenceMap;

/// Parse a full document into `Blocks` plus the reference map accumulated
/// along the way. Pure: no I/O, no shared state beyond this call.
///
/// When `options.debug` is set, the container tree is dumped via
/// `log::debug!` on the logging channel and an empty `Blocks` is returned
/// instead of running the transformer.
pub fn parse(options: &ParserOptions, text: &str) -> (Blocks, ReferenceMap) {
    let lines = line::split_lines(text);
    let (children, refmap) = container::build(&lines);

    if options.debug {
        log::debug!("container tree:\n{children:#?}");
        return (Vec::new(), refmap);
    }

    // `process_elts` only errors on a Document nested below the stack
    // root, which this crate's own builder never produces; treat it as
    // the invariant violation the design calls it.
    let blocks = transform::process_elts(&children, &refmap)
        .unwrap_or_else(|err| panic!("{err}"));
    (blocks, refmap)
}
