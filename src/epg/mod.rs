//! EPG ingestion: XMLTV scan, channel matching and guide merge.

mod index;
mod ingest;
mod merge;
mod parser;

pub use index::{GuideMatch, IdentityIndex, RefMatch};
pub use ingest::{fetch_and_ingest, ingest, ingest_with_stats, GuideWindow, IngestStats};
pub use merge::{dedup_and_sort, merge_guide};
pub use parser::{scan_programmes, MalformedElement, RawProgramme, DEFAULT_TITLE};
