pub mod city;
pub mod document;
pub mod document_id;
pub mod file;
pub mod info;
pub mod inventory;
pub mod operations;
pub mod state;

pub use city::*;
pub use document::*;
pub use document_id::*;
pub use file::*;
pub use info::*;
pub use inventory::*;
pub use operations::*;
pub use state::*;
