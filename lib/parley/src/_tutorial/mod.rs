//! # Tutorial: Querying HTTP APIs with parley
//!
//! Learn to describe API interactions as queries, step by step.
//!
//! ## Chapters
//!
//! 1. [Getting Started][chapter_0] - Your first query and executor
//! 2. [Exchanges][chapter_1] - Multi-request queries and combinators
//! 3. [Middleware][chapter_2] - Pipes, chains and the built-in middleware
//! 4. [Transports & Pagination][chapter_3] - Senders, clients and pages
//!
//! Ready? Start with [Chapter 0: Getting Started][chapter_0].

pub mod chapter_0;
pub mod chapter_1;
pub mod chapter_2;
pub mod chapter_3;
