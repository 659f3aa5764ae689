use serde::{Deserialize, Serialize};

pub mod reporter;
pub mod table;

pub use reporter::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

pub fn add_file_extension(path: &str, format: &OutputFormat) -> String {
    let extension = match format {
        OutputFormat::Table => ".txt",
        OutputFormat::Json => ".json",
    };

    if path.ends_with(extension) {
        path.to_string()
    } else {
        format!("{}{}", path, extension)
    }
}
