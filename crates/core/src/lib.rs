//! Mail message model for Courier.
//!
//! [`Message`] is the input every delivery integration consumes: envelope
//! fields, a case-insensitive [`HeaderMap`], a [`Body`] of one or more
//! [`Part`]s, [`Attachment`]s and the provider-specific extension fields.

pub mod attachment;
pub mod body;
pub mod error;
pub mod header;
pub mod message;
pub mod recipients;
mod rfc822;

pub use attachment::Attachment;
pub use body::{Body, Part, TEXT_AMP_HTML, TEXT_HTML, TEXT_PLAIN};
pub use error::MessageError;
pub use header::{FoldedHeaders, HeaderMap, HeaderValue, fold_name};
pub use message::{Message, VariableMap};
pub use recipients::Recipients;
