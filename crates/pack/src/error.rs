use std::fmt;

/// One of the three lattice axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Why a single extent was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionIssue {
    NotPositive,
    NotANumber,
    NotInteger,
    NotFinite,
    TooLarge { max: u32 },
}

impl fmt::Display for DimensionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionIssue::NotPositive => f.write_str("must be at least 1"),
            DimensionIssue::NotANumber => f.write_str("not a number"),
            DimensionIssue::NotInteger => f.write_str("must be a whole number"),
            DimensionIssue::NotFinite => f.write_str("must be finite"),
            DimensionIssue::TooLarge { max } => write!(f, "must be at most {max}"),
        }
    }
}

/// Errors from pack generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    #[error("invalid {axis} dimension {value:?}: {issue}")]
    InvalidDimension {
        axis: Axis,
        value: String,
        issue: DimensionIssue,
    },
    #[error("pack of {requested} cells exceeds the limit of {max}")]
    TooManyCells { requested: u64, max: u64 },
    #[error("no cell template loaded")]
    MissingTemplate,
}

impl PackError {
    /// All pack errors are rejected requests for a grid shape.
    pub fn is_invalid_dimension(&self) -> bool {
        matches!(
            self,
            PackError::InvalidDimension { .. }
                | PackError::TooManyCells { .. }
                | PackError::MissingTemplate
        )
    }

    pub(crate) fn dimension(axis: Axis, value: impl ToString, issue: DimensionIssue) -> Self {
        PackError::InvalidDimension {
            axis,
            value: value.to_string(),
            issue,
        }
    }
}
