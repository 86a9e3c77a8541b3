//! `br`: backup command orchestration for a distributed database cluster.
//!
//! # Overview
//!
//! This crate is the layer between the operator and the backup engine.  It
//! picks the backup scope from the command line, prepares the process
//! runtime once, assembles a validated [`config::BackupConfig`], and hands it
//! to a [`dispatch::BackupRunner`] together with a cancellable
//! [`context::ExecutionContext`].  The backup protocol itself belongs to the
//! runner; the shipped [`runner::EngineRunner`] drives an external engine
//! executable.
//!
//! # Usage
//!
//! ```text
//! br backup full  --pd 10.0.1.1:2379 -s s3://backups/prod
//! br backup db    --pd 10.0.1.1:2379 -s local:///data/br --db shop
//! br backup table --pd 10.0.1.1:2379 -s local:///data/br --db shop --table orders
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                  |
//! |--------------------------|-------------------------------------------------|
//! | [`cli`]                  | Command tree and flags parsed by clap           |
//! | [`config`]               | Defaults file, `BackupConfig` assembly          |
//! | [`preflight`]            | One-time runtime preparation                    |
//! | [`runtime`]              | Runtime toggles and the reporting unit          |
//! | [`context`]              | Cancellable execution context                   |
//! | [`dispatch`]             | `BackupRunner` contract and the dispatcher      |
//! | [`glue`]                 | Session access for runners                      |
//! | [`runner`]               | Engine-backed runner and argument construction  |
//! | [`commands::backup`]     | `br backup` and its leaves                      |
//! | [`logging`]              | Log sink setup                                  |
//! | [`summary`]              | End-of-run summary line                         |
//! | [`ui`]                   | Spinner and captured engine output              |
//! | [`error`]                | Validation and preflight errors                 |

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod glue;
pub mod logging;
pub mod preflight;
pub mod runner;
pub mod runtime;
pub mod summary;
pub mod ui;
