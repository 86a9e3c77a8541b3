//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation                         | Description                  |
//! |---------------|------------------------------------|------------------------------|
//! | `backup.rs`   | `br backup <full\|db\|table>`      | Preflight, assemble, dispatch |

pub mod backup;
