//! Report generation for quizforge attempts.
//!
//! Renders an [`AttemptReport`](quizforge_core::report::AttemptReport) as a
//! self-contained HTML page or as Markdown.

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html_report};
pub use markdown::{generate_markdown, write_markdown_report};
