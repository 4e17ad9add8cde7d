//! Prelude module for convenient imports.
//!
//! ```
//! use parley_core::prelude::*;
//! ```

pub use crate::{
    Auth, Error, Exchange, ExchangeExt, Executor, Method, Page, Pagelike, Pipe, PipeExt, Query,
    Request, Response, Result, SenderRegistry, Session, Step,
};
pub use crate::{exchange, pipe, query};
