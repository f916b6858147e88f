#![allow(dead_code)]

mod backend;

pub use backend::*;
