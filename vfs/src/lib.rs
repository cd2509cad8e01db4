#![no_std]

mod error;
mod kind;
mod stat;

pub use self::{error::Error, kind::EntryKind, stat::Stat};
