use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Immutable description of one compositing job: where the base image lives,
/// which replacement sources fill its greenscreen regions (in
/// largest-region-first order) and where the result goes.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub base_image: PathBuf,
    pub replacements: Vec<PathBuf>,
    pub output: PathBuf,
}

impl JobConfig {
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder::default()
    }

    /// Check that every referenced input path exists. Runs before any file
    /// is decoded so a bad path never costs a partial run.
    pub fn validate(&self) -> Result<()> {
        if !self.base_image.exists() {
            return Err(Error::NotFound(self.base_image.clone()));
        }
        for path in &self.replacements {
            if !path.exists() {
                return Err(Error::NotFound(path.clone()));
            }
        }
        Ok(())
    }
}

/// Collects job inputs one at a time, then validates them in a single step.
/// Selection surfaces (CLI, dialogs) fill this in and only get a `JobConfig`
/// back once nothing is missing.
#[derive(Debug, Default)]
pub struct JobConfigBuilder {
    base_image: Option<PathBuf>,
    replacements: Vec<PathBuf>,
    output: Option<PathBuf>,
}

impl JobConfigBuilder {
    pub fn base_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_image = Some(path.into());
        self
    }

    pub fn replacement(mut self, path: impl Into<PathBuf>) -> Self {
        self.replacements.push(path.into());
        self
    }

    pub fn replacements<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.replacements.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Produce a complete configuration, or name every field still missing.
    pub fn build(self) -> Result<JobConfig> {
        let mut missing = Vec::new();
        if self.base_image.is_none() {
            missing.push("base image");
        }
        if self.replacements.is_empty() {
            missing.push("at least one replacement source");
        }
        if self.output.is_none() {
            missing.push("output path");
        }
        if !missing.is_empty() {
            return Err(Error::MissingInputs(missing));
        }

        Ok(JobConfig {
            base_image: self.base_image.unwrap_or_default(),
            replacements: self.replacements,
            output: self.output.unwrap_or_default(),
        })
    }
}

/// Extensions the inspection tool treats as images when scanning a folder.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_complete_config() {
        let config = JobConfig::builder()
            .base_image("base.png")
            .replacement("a.mp4")
            .replacement("b.mp4")
            .output("out.mp4")
            .build()
            .unwrap();

        assert_eq!(config.base_image, PathBuf::from("base.png"));
        assert_eq!(config.replacements.len(), 2);
        assert_eq!(config.output, PathBuf::from("out.mp4"));
    }

    #[test]
    fn build_reports_every_missing_field() {
        let err = JobConfig::builder().build().unwrap_err();
        match err {
            Error::MissingInputs(fields) => {
                assert_eq!(fields.len(), 3);
                assert!(fields.contains(&"base image"));
                assert!(fields.contains(&"output path"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_rejects_missing_paths() {
        let config = JobConfig::builder()
            .base_image("/definitely/not/here.png")
            .replacement("also-missing.mp4")
            .output("out.mp4")
            .build()
            .unwrap();

        assert!(matches!(config.validate(), Err(Error::NotFound(_))));
    }

    #[test]
    fn image_file_detection_is_case_insensitive() {
        assert!(is_image_file(Path::new("photo.JPG")));
        assert!(is_image_file(Path::new("photo.png")));
        assert!(!is_image_file(Path::new("clip.mp4")));
        assert!(!is_image_file(Path::new("noext")));
    }
}
