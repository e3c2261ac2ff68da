//! Pattern Formatter Engine — rule-based document structure inference.
//!
//! Raw lines are classified one at a time against a fixed, priority-ordered
//! pattern table, grouped into a section tree, and summarised into stats
//! and a layout plan for the document writer. No I/O happens here.

pub mod classifier;
pub mod numbering;
pub mod patterns;
pub mod policy;
pub mod processor;
pub mod structure;

pub use classifier::{LineClassification, LineContext, LineKind, PatternEngine};
pub use patterns::{Category, PatternLibrary};
pub use policy::{LayoutPlan, NumberingMode};
pub use processor::{DocumentAnalysis, DocumentProcessor, DocumentStats};
pub use structure::{ContentItem, Section, StructuringState};
