//! In-process request tracing core: application code attaches short textual
//! events to a per-request [`trace::Trace`] carried in an ambient
//! [`context::Context`]; recent traces are retained in bounded
//! [`ring::RingBuffer`]s keyed by category, searched through
//! [`collector::Collector`] and [`multi_searcher::MultiSearcher`], and
//! streamed live through the [`broker::Broker`].
//!
//! This crate does not install a global `tracing` subscriber, bind an HTTP
//! transport, or parse CLI flags — those are external collaborators. It only
//! emits `tracing` call sites at the decision points documented per module.

pub mod broker;
pub mod collector;
pub mod context;
pub mod decorators;
pub mod duration;
pub mod error;
pub mod event;
pub mod filter;
pub mod multi_searcher;
pub mod ring;
pub mod ring_set;
pub mod search;
pub mod snapshot;
pub mod trace;

pub use context::Context;
pub use error::{Result, TraceError};
pub use trace::{Trace, TraceId, Traceable};
