use std::path::{Path, PathBuf};

pub const JSON_EXTENSION: &str = "json";

/// Map an input CSV file to its JSON output path.
/// Same directory and base name, extension replaced by `.json`.
pub fn derive_output_path(input_file: &Path) -> PathBuf {
    input_file.with_extension(JSON_EXTENSION)
}

/// Use the explicit output path when given, otherwise derive one
pub fn resolve_output_path(input_file: &Path, output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(input_file))
}
