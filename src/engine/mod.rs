//! Terminal front end for the step runner
//!
//! The runner itself lives in the `stepwise` crate and knows nothing about
//! terminals. This module supplies its collaborators:
//!
//! - **reporter**: live per-step output and spinners
//! - **confirm**: yes/no prompts, dialoguer on a TTY and plain lines otherwise
//! - **summary**: end-of-run and status reports

pub mod confirm;
pub mod reporter;
pub mod summary;

pub use confirm::TerminalConfirmer;
pub use reporter::TerminalProgress;
