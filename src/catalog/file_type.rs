use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Maps an uploaded file's extension to a client-facing kind (`image`, `pdf`, ...).
#[derive(Debug, Clone, Default)]
pub struct FileTypeClassifier {
    by_extension: HashMap<String, String>,
}

impl FileTypeClassifier {
    /// Builds the lookup from a kind -> extensions table (the `[file_types]` config section).
    pub fn from_table(table: &BTreeMap<String, Vec<String>>) -> Self {
        let mut by_extension = HashMap::new();
        for (kind, extensions) in table {
            for ext in extensions {
                let ext = ext.trim().trim_start_matches('.').to_lowercase();
                by_extension.insert(ext, kind.clone());
            }
        }
        Self { by_extension }
    }

    /// Classifies a stored filename by its extension, case-insensitively.
    pub fn classify(&self, filename: &str) -> Option<&str> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        self.by_extension.get(&ext).map(String::as_str)
    }
}
