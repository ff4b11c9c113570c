use serde::{Deserialize, Serialize};

use super::symbol::Side;

/// Per-position record of the surviving input and the failing input,
/// each paired with the animation it plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
    /// Tree index this step was built from.
    pub index: usize,
    pub correct_choice: Side,
    pub success_asset: &'static str,
    pub wrong_choice: Side,
    pub failure_asset: &'static str,
}

impl StepDescriptor {
    /// The page-facing shape: `[[correct, success], [wrong, failure]]`.
    pub fn to_pairs(&self) -> [[&'static str; 2]; 2] {
        [
            [self.correct_choice.as_str(), self.success_asset],
            [self.wrong_choice.as_str(), self.failure_asset],
        ]
    }

    /// File stem of this step's numbered success copy.
    pub fn copy_name(&self) -> String {
        format!("{}_{}", self.success_asset, self.index)
    }
}

/// A request to copy `<source>.gif` into the output folder as `<source>_<index>.gif`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CopyRequest {
    pub source: String,
    pub index: usize,
}

impl CopyRequest {
    pub fn dest_name(&self) -> String {
        format!("{}_{}", self.source, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_pairs_shape() {
        let step = StepDescriptor {
            index: 3,
            correct_choice: Side::L,
            success_asset: "RNL",
            wrong_choice: Side::R,
            failure_asset: "RN_DEATH",
        };
        assert_eq!(step.to_pairs(), [["L", "RNL"], ["R", "RN_DEATH"]]);
        assert_eq!(step.copy_name(), "RNL_3");
    }

    #[test]
    fn copy_request_dest_name() {
        let req = CopyRequest {
            source: "NLN".to_string(),
            index: 12,
        };
        assert_eq!(req.dest_name(), "NLN_12");
    }
}
