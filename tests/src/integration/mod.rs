//! End-to-end flows driving `DocumentEngine` blocks over `InMemoryLedger`.

pub mod fixtures;

mod flows;
mod transfer;
