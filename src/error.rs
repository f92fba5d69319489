use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Not enough observations were proposed. Position solving
    /// requires at least 4 of them, whatever their quality.
    #[error("not enough observations: {0} (4 at least)")]
    NotEnoughObservations(usize),

    /// Satellite positions and measured ranges must be paired.
    #[error("internal error: {0} satellites for {1} ranges")]
    SizeMismatch(usize, usize),

    /// A 3x3 system could not be solved: no pivot above the
    /// near zero threshold. This is typically caused by degenerate
    /// (collinear or clustered) satellite geometry.
    #[error("singular or ill-conditioned 3x3 system")]
    SingularMatrix,
}
