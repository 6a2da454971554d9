//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The engine emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Search(SearchEvent::Progress(p)) => {
//!                 println!("Matched {}/{}", p.queries_completed, p.total_queries)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the matcher with the sender
//! matcher.find_best_matches_with_events(&queries, &references, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
