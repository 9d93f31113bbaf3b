//! Integration tests driving the sync coordinator against in-memory stores.

mod concurrency_test;
mod delete_test;
mod helpers;
mod mutation_test;
