//! Partitioning errors.
//!
//! Every variant identifies the offending function by the top-level unit it
//! was found in and its path within that unit.

use kiln_ir::{AttrError, GlobalVar};
use kiln_path::{Path, PathPair};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// A marked function has no external name, but the cache requires one.
    #[error("function at {path} in {unit} is marked for `{compiler}` but has no `{key}` attribute")]
    MissingGlobalSymbol {
        unit: GlobalVar,
        path: Path,
        compiler: String,
        key: String,
    },

    /// Two structurally different functions claim the same external name.
    #[error(
        "global symbol `{name}` is claimed by a different function at {path} in {unit} \
         (first difference: {mismatch})"
    )]
    ConflictingGlobalSymbol {
        name: String,
        unit: GlobalVar,
        path: Path,
        /// First difference, earlier claimant on the left.
        mismatch: PathPair,
    },

    /// A marked function uses a variable bound outside of it, so it cannot
    /// become a top-level unit.
    #[error("marked function in {unit} captures variable `%{name}` at {path}")]
    CapturedVariable {
        unit: GlobalVar,
        /// Path of the captured variable.
        path: Path,
        name: String,
    },

    /// A marker or name attribute has the wrong payload type.
    #[error("attribute at {path} in {unit} must be a {expected}, found {found}")]
    MalformedAttribute {
        unit: GlobalVar,
        /// Path of the attribute value itself.
        path: Path,
        expected: &'static str,
        found: &'static str,
    },
}

impl PartitionError {
    /// Attach the location of the attribute map `attrs` to an [`AttrError`].
    pub(crate) fn malformed(unit: &GlobalVar, attrs: &Path, err: AttrError) -> Self {
        match err {
            AttrError::WrongType {
                key,
                expected,
                found,
            } => PartitionError::MalformedAttribute {
                unit: unit.clone(),
                path: attrs.map_value(key),
                expected,
                found,
            },
        }
    }

    /// The top-level unit the error was found in.
    pub fn unit(&self) -> &GlobalVar {
        match self {
            PartitionError::MissingGlobalSymbol { unit, .. }
            | PartitionError::ConflictingGlobalSymbol { unit, .. }
            | PartitionError::CapturedVariable { unit, .. }
            | PartitionError::MalformedAttribute { unit, .. } => unit,
        }
    }
}
