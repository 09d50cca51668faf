//! # Grid Battle Client Library
//!
//! A thin terminal client for the grid battle server. It keeps no game state
//! of its own: every rule lives on the server, and the client only relays
//! lines in both directions.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Classifies typed lines: empty lines are skipped, a line starting with
//! `QUIT` in any casing is sent and then ends input.
//!
//! ### Network Module (`network`)
//! Connects over TCP, prints everything the server sends and forwards input
//! lines newline-terminated.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let client = Client::connect("127.0.0.1", 8080).await?;
//!     client.run().await
//! }
//! ```

pub mod input;
pub mod network;
