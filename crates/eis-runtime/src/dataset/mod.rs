//! Dataset assembly pipeline

pub mod assembler;
pub mod imputation;
pub mod shuffle;
pub mod table;
pub mod toggles;

pub use assembler::{Dataset, DatasetAssembler, FeatureMatrix};
pub use imputation::{DeclaredPolicy, DropIncomplete, ImputationMode, ImputationStrategy};
pub use shuffle::{Identity, RowOrder, SeededShuffle};
pub use table::{JoinedRow, JoinedTable};
pub use toggles::FeatureToggles;
