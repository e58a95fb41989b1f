//! # Conference chat API
//!
//! HTTP front of the conference assistant. One endpoint accepts a chat query
//! and streams the turn back as server-sent events:
//!
//! ```text
//! POST /api/v1/chat/invoke
//!   data: {"type":"status","step":"crew_kickoff","message":"..."}
//!   data: {"type":"result","message":"..."}     (or "error")
//! ```
//!
//! Each request runs one orchestrated turn: the tool service is started or
//! connected, the manager answers or delegates to the conference specialist,
//! and the session is torn down when the turn ends or the client goes away.
//!
//! - **GET** `/` - liveness
//! - **GET** `/api-doc/openapi.json` - OpenAPI document

pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;

pub use server::{build_router, AppState, ChatServer, TurnRunner};
