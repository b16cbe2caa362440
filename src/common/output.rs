use std::path::{Path, PathBuf};

/// Paths written by the validate command
#[derive(Debug, Clone)]
pub struct ValidationOutputPaths {
    pub records: PathBuf,
    pub funnel: PathBuf,
    pub manual: PathBuf,
}

impl ValidationOutputPaths {
    /// Generate sibling paths from the records path
    /// "checked.csv.gz" -> "checked.csv.gz", "checked_funnel.json", "checked_manual.csv.gz"
    pub fn from_base<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let name = base.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let (stem, extension) = match name.split_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (name, None),
        };
        let parent = base.parent();

        let make_path = |filename: String| -> PathBuf {
            match parent {
                Some(p) if !p.as_os_str().is_empty() => p.join(filename),
                _ => PathBuf::from(filename),
            }
        };

        let manual = match extension {
            Some(ext) => format!("{}_manual.{}", stem, ext),
            None => format!("{}_manual", stem),
        };

        Self {
            records: base.to_path_buf(),
            funnel: make_path(format!("{}_funnel.json", stem)),
            manual: make_path(manual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_generation() {
        let paths = ValidationOutputPaths::from_base("checked.csv");
        assert_eq!(paths.records, PathBuf::from("checked.csv"));
        assert_eq!(paths.funnel, PathBuf::from("checked_funnel.json"));
        assert_eq!(paths.manual, PathBuf::from("checked_manual.csv"));
    }

    #[test]
    fn test_output_path_with_directory_and_gzip() {
        let paths = ValidationOutputPaths::from_base("/path/to/checked.jsonl.gz");
        assert_eq!(paths.funnel, PathBuf::from("/path/to/checked_funnel.json"));
        assert_eq!(paths.manual, PathBuf::from("/path/to/checked_manual.jsonl.gz"));
    }

    #[test]
    fn test_output_path_no_extension() {
        let paths = ValidationOutputPaths::from_base("checked");
        assert_eq!(paths.funnel, PathBuf::from("checked_funnel.json"));
        assert_eq!(paths.manual, PathBuf::from("checked_manual"));
    }
}
