//! fax-util - shared foundation types for the faxc-mini compiler.
//!
//! Holds the two pieces of state every later pass needs and that have no
//! natural home in any single pipeline stage: source coordinates
//! ([`SourceLocation`]) and lexical scoping ([`SymbolTable`]).

mod location;
mod symtab;

pub use location::SourceLocation;
pub use symtab::SymbolTable;
