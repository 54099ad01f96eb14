pub mod export_loader;

pub use export_loader::{load_export, load_export_file, ExportReader, GenericExportReader};
