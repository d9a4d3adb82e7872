//! # webp-optimizer
//!
//! Upload an image, choose a size and quality, get back a WebP with every
//! byte of embedded metadata removed.
//!
//! # Architecture: Endpoint + Workflow
//!
//! ```text
//! SelectedFile ─▶ workflow::ImageProcessor ─▶ Transport ─▶ server::process_upload
//!     (select, options, process,                (HTTP or      (validate, decode,
//!      preview, download)                        in-process)   strip, resize, encode)
//! ```
//!
//! The endpoint is stateless per request and returns the result inline as a
//! base64 data URL. The workflow owns everything stateful: the selection, the
//! options being edited, the single live preview, and the last result.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`server`] | axum router, multipart parsing, validation, JSON responses |
//! | [`workflow`] | Client state machine, preview handles, resize controls, transports |
//! | [`imaging`] | Codec backend trait, dimension math, the `image`/`resvg`/`webp` backend |
//! | [`config`] | `config.toml` loading over stock defaults, validation |
//! | [`types`] | Wire and state types shared by the endpoint and the workflow |
//! | [`formats`] | Accepted MIME types, data URL encoding and decoding |
//! | [`naming`] | Download file names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure Transitions, Effects at the Edge
//!
//! [`workflow::ProcessorState::apply`] is a pure function from state and
//! event to the next state plus the preview handles it dropped. The
//! processor performs I/O and releases those handles. Every transition is
//! therefore testable without a transport, and no path can leak a preview.
//!
//! ## One Validation Path
//!
//! The HTTP handler only turns a multipart body into a
//! [`server::UploadForm`]. Validation and processing live in
//! [`server::process_upload`], which the in-process transport calls too, so
//! the CLI and the service reject the same inputs with the same messages.
//!
//! ## Blocking Codec Work
//!
//! Decoding, resizing, and encoding are CPU-bound and run on tokio's
//! blocking pool. The reactor only ever waits on them.

pub mod config;
pub mod formats;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod server;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;
