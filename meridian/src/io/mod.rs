//! Asynchronous tile fetching: the IO thread, the fetch loop, and the cache front end.

pub(crate) mod fetch;
pub(crate) mod http;
pub(crate) mod runtime;
pub(crate) mod tiles_io;

pub use fetch::Fetch;
pub use http::{HeaderValue, HttpOptions, MaxParallelDownloads};
pub use tiles_io::{Stats, TileState};
