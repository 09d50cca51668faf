//! # Grid Battle Server Library
//!
//! This library provides the authoritative server for a small turn-based
//! arena game played over plain TCP text lines. Up to four players share a
//! 5x5 grid with fixed obstacles, take turns to move or throw a shuriken,
//! and are knocked out once their health runs out.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Game State
//! All rules are enforced here. Clients only send command lines and print
//! whatever the server sends back.
//!
//! ### Client Management
//! Handles the complete lifecycle of a connection:
//! - Seating a new connection in the lowest free slot, or turning it away
//! - Line-oriented command intake, one worker task per connection
//! - Quit, disconnect and defeat cleanup
//!
//! ### State Broadcasting
//! After every accepted command the full grid and player table is sent to
//! every seated player, followed by a turn announcement.
//!
//! ## Architecture Design
//!
//! ### One Lock, One Step
//! Game state and the connection table live together behind a single async
//! mutex. A worker holds it for a whole step, including delivering the
//! messages that step produced, so every player sees steps in the same order.
//!
//! ### Messages as Values
//! Game logic never touches sockets. Each step returns a list of
//! `GameMessage`s (send, broadcast, close) that the client manager carries
//! out in order.
//!
//! ## Module Organization
//!
//! ### Game Modules (`game`, `turn`, `shuriken`, `commands`)
//! Grid, players, turn rotation, projectile flight and the command pipeline.
//!
//! ### Wire Text (`messages`, `snapshot`)
//! Every advisory line and the `STATE` snapshot format.
//!
//! ### Networking (`network`, `client_manager`)
//! The accept loop, per-connection workers and best-effort delivery.
//!
//! ### Ambient (`config`, `error`)
//! Server settings and the errors that stop the server as a whole.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(&ServerConfig::new(8080)).await?;
//!
//!     // Runs until Ctrl+C, then closes every connection
//!     server
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod commands;
pub mod config;
pub mod error;
pub mod game;
pub mod messages;
pub mod network;
pub mod shuriken;
pub mod snapshot;
pub mod turn;
