//! `querydrop-render`: result set to artifact, plus filename templating.
//!
//! | Format | Artifact | Extension |
//! |--------|----------|-----------|
//! | `csv`  | text     | `csv`     |
//! | `pipe` | text     | `txt`     |
//! | `pdf`  | binary   | `pdf`     |

pub mod delimited;
pub mod error;
pub mod filename;
pub mod pdf;

use querydrop_core::{Artifact, OutputFormat, ResultSet};
use tracing::info;

pub use error::{RenderError, Result};
pub use filename::{expand_timestamps, resolve_filename};

/// Render `set` in the requested format. Pure: no I/O.
pub fn render(set: &ResultSet, include_header: bool, format: OutputFormat) -> Result<Artifact> {
    let artifact = match format {
        OutputFormat::Csv => {
            Artifact::Text(delimited::to_delimited(set, include_header, delimited::COMMA)?)
        }
        OutputFormat::Pipe => {
            Artifact::Text(delimited::to_delimited(set, include_header, delimited::PIPE)?)
        }
        OutputFormat::Pdf => Artifact::Binary(pdf::to_pdf(set, include_header)?),
    };
    info!(%format, bytes = artifact.len(), kind = artifact.kind(), "artifact rendered");
    Ok(artifact)
}
