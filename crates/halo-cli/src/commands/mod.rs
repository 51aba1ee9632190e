pub mod compare;
pub mod convert;
pub mod cumulative;
pub mod magnitude;
pub mod magnitude_bos;
pub mod prune;
pub mod score;
pub mod symmetric;
pub mod voting;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Rolling mean voting: +1 per step a token is attended above the mean
    Voting(voting::VotingArgs),
    /// Symmetric voting: start at 255, +1 above the mean, -1 otherwise
    Symmetric(symmetric::SymmetricArgs),
    /// Magnitude-weighted voting against the whole-vector mean
    Magnitude(magnitude::MagnitudeArgs),
    /// Magnitude-weighted voting with a BOS-excluded threshold
    MagnitudeBos(magnitude_bos::MagnitudeBosArgs),
    /// Cumulative brightness with distance weighting and decay
    Cumulative(cumulative::CumulativeArgs),
    /// Run every strategy and write a side-by-side comparison report
    Compare(compare::CompareArgs),
    /// Show which sentences a strategy would keep and which it would prune
    Prune(prune::PruneArgs),
    /// Rewrite a capture in another record format
    Convert(convert::ConvertArgs),
}
