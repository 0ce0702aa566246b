pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use itertools::{iproduct, Itertools as _};
pub use log::{error, info, warn};
pub use ndarray::{concatenate, s, Array2, Array3, ArrayView2, ArrayView3, Axis};
pub use serde::{Deserialize, Serialize};
pub use std::{
    fmt,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
