//! Error types for scene construction.

use thiserror::Error;

/// Errors detected while building or validating a scene.
///
/// Tracing itself never fails: every ray produces a colour. All structural
/// problems are reported here, once, when the scene is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A CSG node has no positive members.
    #[error("CSG object '{0}' has no positive members")]
    EmptyCsg(String),

    /// A CSG member does not bound a solid interior.
    #[error("member '{member}' of CSG object '{csg}' has no inside/outside")]
    NotSolid {
        /// Name of the CSG node.
        csg: String,
        /// Name of the offending member.
        member: String,
    },

    /// A property refers to an object name that is not in the scene.
    #[error("no scene object named '{0}'")]
    UnknownObject(String),

    /// A name that must identify a single primitive is used more than once.
    #[error("object name '{0}' is ambiguous ({1} objects share it)")]
    DuplicateName(String, usize),

    /// A property requires a primitive but the name refers to a composite.
    #[error("scene object '{0}' is not a primitive")]
    NotAPrimitive(String),

    /// A property requires a global surface parametrisation the shape lacks.
    #[error("shape of '{0}' has no global (u, v) parametrisation")]
    NotParametrised(String),

    /// Two surfaces cannot be related one-to-one.
    #[error("'{from}' and '{to}' cannot be mapped one-to-one: {reason}")]
    NotOneToOne {
        /// Source object.
        from: String,
        /// Target object.
        to: String,
        /// Reason the mapping fails.
        reason: String,
    },

    /// A property parameter is out of range.
    #[error("invalid parameter for '{object}': {reason}")]
    InvalidParameter {
        /// Object carrying the property.
        object: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for scene construction.
pub type Result<T> = std::result::Result<T, SceneError>;
