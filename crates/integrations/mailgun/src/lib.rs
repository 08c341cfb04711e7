//! Mailgun delivery for Courier.
//!
//! Turns a [`courier_core::Message`] into the multipart form fields of the
//! [Mailgun messages API](https://documentation.mailgun.com/docs/mailgun/api-reference/openapi-final/tag/Messages/)
//! and submits them.
//!
//! - [`transform`] is the pure message-to-fields step.
//! - [`HttpMailgunClient`] posts a [`FieldMap`] to the API.
//! - [`Dispatcher`] ties both together with per-domain configuration.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use courier_core::Message;
//! use courier_mailgun::{Dispatcher, MailgunConfig};
//!
//! # async fn run() -> Result<(), courier_mailgun::MailgunError> {
//! let dispatcher = Dispatcher::new(MailgunConfig::new("key-xxxx").with_domain("example.org"));
//!
//! let mut message = Message::new()
//!     .with_from("noreply@example.org")
//!     .with_to("user@example.com")
//!     .with_subject("Welcome")
//!     .with_text("Hello!");
//!
//! let response = dispatcher.deliver(&mut message).await?;
//! println!("{} {:?}", response.code, message.message_id());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fields;
pub mod http;
pub mod transform;

pub use client::{ClientFactory, MailgunClient, MailgunResponse, TEST_MODE_RESPONSE};
pub use config::{DomainOverride, MailgunConfig, MailgunSettings};
pub use dispatcher::Dispatcher;
pub use error::{ConfigurationError, MailgunError};
pub use fields::{AttachmentPart, FieldMap, FieldValue};
pub use http::{HttpClientFactory, HttpMailgunClient};
pub use transform::{TraceEvent, Transformed, transform};
