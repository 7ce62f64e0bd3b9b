//! Participant roster: normalization of heterogeneous sheets, CSV files and the snapshot.

pub mod classify;
pub mod csv_io;
pub mod handlers;
pub mod loader;
pub mod model;
pub mod normalizer;

pub use classify::{classify, Classification, ExchangeKind};
pub use csv_io::CsvError;
pub use loader::{load_from_sheet, SheetCache};
pub use model::{
    deduplicate, default_tutors, partition, PaidSet, ParticipantRecord, RosterGroup, COLUMNS,
    SPECIAL_TYPE,
};
pub use normalizer::{normalize, RawTable};
