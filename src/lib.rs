#![doc = include_str!("../README.md")]
#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod macros;

pub mod compact;
mod engine;
pub mod link;
pub mod map;
mod root;
pub mod standard;
pub mod validate;

#[cfg(test)]
mod testing;

pub use self::{
    link::{Color, Dir},
    map::{Adapter, Map},
    root::Root,
};
