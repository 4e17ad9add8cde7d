//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions for
//! easy glob importing:
//!
//! ```
//! use parley::prelude::*;
//! ```

pub use crate::middleware::{FollowRedirects, Json, Logging, Retry, expect_json, load_json, raise_for_status};
pub use crate::{
    Auth, ContentType, Error, Exchange, ExchangeExt, Executor, HyperClient, Method, Page, Pagelike, Pipe,
    PipeExt, Query, RawClient, Request, Response, Result, SenderRegistry, Session, Step, executor,
};
pub use crate::{exchange, pipe, query};
pub use serde::{Deserialize, Serialize};
