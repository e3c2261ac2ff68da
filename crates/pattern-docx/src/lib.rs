//! Pattern Formatter DOCX — WordprocessingML output for analysed documents.
//!
//! Page breaks, list numbering and list-vs-paragraph rendering all come
//! from the engine's [`LayoutPlan`](pattern_engine::LayoutPlan); this crate
//! makes no structural decisions of its own.

pub mod body;
pub mod parts;
pub mod writer;

pub use writer::{DocxWriter, RenderOptions};
