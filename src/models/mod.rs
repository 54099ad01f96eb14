pub mod highlight;
pub mod loaders;
pub mod note;

pub use highlight::{
    available_dates, available_sources, FilterCriteria, HighlightColumns, NormalizedExport,
    RawHighlight, ResolvedEntry, SelectedHighlight,
};
pub use loaders::{load_export, ExportReader, GenericExportReader};
pub use note::{AudioAttachment, AudioSource, FlashcardPayload, SubmissionSummary};
