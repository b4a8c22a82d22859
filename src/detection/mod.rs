mod selector;

pub use selector::{combine_masks, CandidateSelector, Circle, Detection};
