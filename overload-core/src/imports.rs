pub use anyhow::{anyhow, bail, ensure, Context};
pub use itertools::Itertools;
pub use ndarray::Array1;
pub use serde::{Deserialize, Serialize};
pub use std::ffi::OsStr;
pub use std::fs::File;
pub use std::path::{Path, PathBuf};
pub use validator::Validate;

pub use crate::traits::*;
pub use overload_proc_macros::{ApproxEq, HistoryVec};
