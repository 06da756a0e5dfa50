//! Pagination module
//!
//! Offset-based "infinite scroll" pagination.
//!
//! # Overview
//!
//! [`PaginationCursor`] tracks limit, offset step, current offset and the
//! server-reported total count for one session. `start` fetches the first
//! page; `load_next` fetches the following windows and appends them to a
//! [`ResultSink`](crate::sink::ResultSink) until `current_offset >= total_count`.
//!
//! Exhaustion is decided from offsets alone. A short page does not end
//! pagination, and a total count smaller than the offset already consumed
//! ends it immediately even if the last page was full.

mod cursor;
mod types;

pub use cursor::PaginationCursor;
pub use types::{
    CursorConfig, CursorSnapshot, LoadOutcome, NotAdvancing, StartOptions, DEFAULT_LIMIT,
    DEFAULT_LIMIT_PARAM, DEFAULT_OFFSET_PARAM, DEFAULT_TOTAL_COUNT_PARAM,
};
