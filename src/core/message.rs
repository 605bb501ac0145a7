//! Message payloads and artifact descriptions

use super::error::TreeLogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named binary or text payload published as a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub name: String,
    pub payload: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Data {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.media_type {
            Some(media_type) => write!(f, "{} [{}; {} bytes]", self.name, media_type, self.len()),
            None => write!(f, "{} [{} bytes]", self.name, self.len()),
        }
    }
}

/// Payload of a single write: plain text or an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Message {
    Text(String),
    Data(Data),
}

impl Message {
    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Message::Data(data) => Some(data),
            Message::Text(_) => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.write_str(text),
            Message::Data(data) => data.fmt(f),
        }
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Text(s)
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_string())
    }
}

impl From<Data> for Message {
    fn from(data: Data) -> Self {
        Message::Data(data)
    }
}

/// How the bytes written to an artifact are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// UTF-8 text (`"w"`)
    Text,
    /// Raw bytes (`"wb"`)
    #[default]
    Binary,
}

impl FileMode {
    pub fn to_str(&self) -> &'static str {
        match self {
            FileMode::Text => "w",
            FileMode::Binary => "wb",
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for FileMode {
    type Err = TreeLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" | "text" => Ok(FileMode::Text),
            "wb" | "binary" => Ok(FileMode::Binary),
            _ => Err(TreeLogError::invalid_mode(s)),
        }
    }
}

/// What a caller asks for when opening an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub mode: FileMode,
    pub media_type: Option<String>,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, mode: FileMode) -> Self {
        Self {
            name: name.into(),
            mode,
            media_type: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FileMode::Text)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, FileMode::Binary)
    }

    /// Parse the mode from its string form, rejecting anything but `w`/`wb`
    pub fn parse(name: impl Into<String>, mode: &str) -> Result<Self, TreeLogError> {
        Ok(Self::new(name, mode.parse()?))
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Wrap captured bytes into a data message carrying this name and media type
    pub fn to_data(&self, payload: Vec<u8>) -> Data {
        Data {
            name: self.name.clone(),
            payload,
            media_type: self.media_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_display() {
        assert_eq!(Data::new("test.dat", b"test1".to_vec()).to_string(), "test.dat [5 bytes]");
        assert_eq!(
            Data::new("dbg.jpg", b"test4".to_vec())
                .with_media_type("image/jpg")
                .to_string(),
            "dbg.jpg [image/jpg; 5 bytes]"
        );
        assert_eq!(Data::new("empty", Vec::new()).to_string(), "empty [0 bytes]");
    }

    #[test]
    fn test_message_display_is_verbatim() {
        let message = Message::from("multiple..\n  ..lines");
        assert_eq!(message.to_string(), "multiple..\n  ..lines");
    }

    #[test]
    fn test_file_mode_parse() {
        assert_eq!("w".parse::<FileMode>().unwrap(), FileMode::Text);
        assert_eq!("wb".parse::<FileMode>().unwrap(), FileMode::Binary);
        let err = "a".parse::<FileMode>().unwrap_err();
        assert!(matches!(err, TreeLogError::InvalidMode { .. }));
    }

    #[test]
    fn test_spec_to_data_keeps_media_type() {
        let spec = ArtifactSpec::binary("plot.png").with_media_type("image/png");
        let data = spec.to_data(vec![1, 2, 3]);
        assert_eq!(data.media_type.as_deref(), Some("image/png"));
        assert_eq!(data.len(), 3);
    }
}
