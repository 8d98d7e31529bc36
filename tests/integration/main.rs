//! Integration tests for the SOW document lifecycle.

mod concurrency_test;
mod delete_test;
mod helpers;
mod lifecycle_test;
mod login_test;
