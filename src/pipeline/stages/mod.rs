pub mod articles;
pub mod classify;
pub mod expand;
pub mod finalize;
pub mod headers;
pub mod supplement;
pub mod template;
pub mod unmerge;
