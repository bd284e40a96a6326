//! Input manager: turns files on disk into uploaded documents

use crate::error::{Result, ScreenerError};
use crate::input::document::{Document, DocumentFormat, JobDescription};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read every resume, preserving the given order. The format is
    /// inferred from the file extension here, at the input boundary.
    pub async fn load_documents(&self, paths: &[PathBuf]) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(self.load_document(path).await?);
        }
        info!("Loaded {} resume(s)", documents.len());
        Ok(documents)
    }

    pub async fn load_document(&self, path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(ScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let format = DocumentFormat::from_file_name(&name);
        let raw_bytes = fs::read(path).await?;

        Ok(Document::new(name, format, raw_bytes))
    }

    /// Read a job description from a plain text or markdown file.
    pub async fn load_job_description(&self, path: &Path) -> Result<JobDescription> {
        let text = fs::read_to_string(path).await.map_err(|e| {
            ScreenerError::InvalidInput(format!(
                "Cannot read job description {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(JobDescription::new(text))
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
