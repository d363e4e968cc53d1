pub mod mvcli_lib;

pub use crate::mvcli_lib::{Error, MvCli};
