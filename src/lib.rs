//! rdcli: an interactive command-line client for key-value stores.
//!
//! The pipeline runs input rendering, tokenization, execution with
//! cluster redirect handling, and reply formatting; the REPL in
//! [`session`] wires it all together.

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod history;
pub mod input;
pub mod registry;
pub mod reply;
pub mod session;
pub mod tokenizer;

pub use config::CliConfiguration;
pub use driver::{Driver, DriverError, NodeId, RedisDriver, StreamKind};
pub use error::{CliError, Result};
pub use executor::{ExecEvent, Executor, Outcome, Redirect};
pub use formatter::{format_reply, Rendered};
pub use history::CommandHistory;
pub use input::render_input;
pub use registry::ClientRegistry;
pub use reply::Reply;
pub use session::{OutputSink, ReplSession, StdoutSink};
pub use tokenizer::{tokenize, SyntaxError};
