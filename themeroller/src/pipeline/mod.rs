//! Coordination primitives for image generation.
//!
//! - [`RenderQueue`] caps how many renders run at once (FIFO admission).
//! - [`InFlightRegistry`] coalesces concurrent requests for the same key.

mod coalesce;
mod queue;

pub use coalesce::{Admission, InFlightRegistry, WaitError, Waiter};
pub use queue::{QueueError, RenderQueue, TaskHandle, DEFAULT_CONCURRENCY_LIMIT};
