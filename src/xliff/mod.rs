//! XLIFF 1.2 reading and writing.
//!
//! Only the parts of the format the synchronizer needs are modeled:
//!
//! ```text
//! <xliff>
//!   <file>
//!     <body>
//!       <trans-unit id="...">
//!         <source>...</source>
//!         <target>...</target>
//!       </trans-unit>
//!     </body>
//!   </file>
//! </xliff>
//! ```
//!
//! Everything else in a document is carried through untouched. Only the first
//! `<file>` element's `<body>` is reconciled.
//!
//! ## Module Structure
//!
//! - `document`: parse a document and render it back with new units
//! - `segment`: `<source>`/`<target>` content
//! - `unit`: translation units and the ordered id-keyed `TermsMap`

mod document;
mod segment;
mod unit;

pub use document::XliffDocument;
pub use segment::Segment;
pub use unit::{TermsMap, TransUnit};

use thiserror::Error;

/// Structural problems found while reading an XLIFF document.
#[derive(Debug, Error)]
pub enum XliffError {
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("expected <xliff> as the root element, found <{0}>")]
    UnexpectedRoot(String),
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(&'static str),
    #[error("<trans-unit> at byte {position} has no id attribute")]
    MissingId { position: usize },
    #[error("trans-unit \"{id}\" has no <source>")]
    MissingSource { id: String },
    #[error("invalid segment markup: {0}")]
    InvalidMarkup(String),
}
