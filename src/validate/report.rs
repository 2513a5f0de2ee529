/// Fixed vocabulary of validator findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    FileTooLarge,
    InvalidZip,
    MissingRequiredFile,
    InvalidXml,
    XmlReadError,
    InvalidImageType,
    CorruptImage,
    ImageReadError,
    TooManySlides,
    ValidationError,
    SmallImage,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::InvalidZip => "INVALID_ZIP",
            Self::MissingRequiredFile => "MISSING_REQUIRED_FILE",
            Self::InvalidXml => "INVALID_XML",
            Self::XmlReadError => "XML_READ_ERROR",
            Self::InvalidImageType => "INVALID_IMAGE_TYPE",
            Self::CorruptImage => "CORRUPT_IMAGE",
            Self::ImageReadError => "IMAGE_READ_ERROR",
            Self::TooManySlides => "TOO_MANY_SLIDES",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::SmallImage => "SMALL_IMAGE",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Accumulated validator output. Warnings never affect `is_valid`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    pub(crate) fn from_issues(errors: Vec<Issue>, warnings: Vec<Issue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|i| i.code == code)
    }

    pub fn count(&self, code: IssueCode) -> usize {
        self.errors
            .iter()
            .chain(&self.warnings)
            .filter(|i| i.code == code)
            .count()
    }
}
