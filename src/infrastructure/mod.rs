//! Infrastructure layer - storage, hashing and logging implementations

pub mod logging;
pub mod storage;
pub mod user;
