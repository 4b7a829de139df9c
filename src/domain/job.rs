use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::status::{Status, StatusTable};

/// Job attributes with a fixed, backend-independent meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetField {
    Name,
    Status,
    Id,
    UploadSpeed,
    DownloadSpeed,
    Uploaded,
    Downloaded,
    Size,
    Eta,
}

impl PresetField {
    pub const ALL: [PresetField; 9] = [
        PresetField::Name,
        PresetField::Status,
        PresetField::Id,
        PresetField::UploadSpeed,
        PresetField::DownloadSpeed,
        PresetField::Uploaded,
        PresetField::Downloaded,
        PresetField::Size,
        PresetField::Eta,
    ];

    /// Converter applied to the matched response leaf
    pub fn field_type(&self) -> FieldType {
        match self {
            PresetField::Name | PresetField::Status | PresetField::Id => FieldType::String,
            PresetField::UploadSpeed | PresetField::DownloadSpeed => FieldType::Speed,
            PresetField::Uploaded | PresetField::Downloaded | PresetField::Size => FieldType::Size,
            PresetField::Eta => FieldType::Seconds,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetField::Name => "name",
            PresetField::Status => "status",
            PresetField::Id => "id",
            PresetField::UploadSpeed => "uploadSpeed",
            PresetField::DownloadSpeed => "downloadSpeed",
            PresetField::Uploaded => "uploaded",
            PresetField::Downloaded => "downloaded",
            PresetField::Size => "size",
            PresetField::Eta => "eta",
        }
    }
}

impl fmt::Display for PresetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a matched field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    UnixDate,
    Speed,
    Size,
    Seconds,
    String,
    Int,
    Float,
    Bool,
    Irrelevant,
}

/// Remaining time of a job; negative backend values mean "never"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Eta {
    Seconds(u64),
    Infinite,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(DateTime<Utc>),
    Speed(u64),
    Size(u64),
    Seconds(Eta),
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job is missing required field '{0}'")]
    FieldMissing(PresetField),
}

/// Fields matched out of one backend job record.
///
/// Built by the response matcher and consumed right away by
/// [`JobViewModel::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRaw {
    preset: HashMap<PresetField, FieldValue>,
    ad_hoc: IndexMap<String, FieldValue>,
}

impl JobRaw {
    pub fn insert_preset(&mut self, field: PresetField, value: FieldValue) {
        self.preset.insert(field, value);
    }

    pub fn insert_ad_hoc(&mut self, name: impl Into<String>, value: FieldValue) {
        self.ad_hoc.insert(name.into(), value);
    }

    pub fn preset(&self, field: PresetField) -> Option<&FieldValue> {
        self.preset.get(&field)
    }

    pub fn ad_hoc(&self) -> &IndexMap<String, FieldValue> {
        &self.ad_hoc
    }

    pub fn is_empty(&self) -> bool {
        self.preset.is_empty() && self.ad_hoc.is_empty()
    }

    fn text(&self, field: PresetField) -> Result<String, JobError> {
        match self.preset(field) {
            Some(FieldValue::String(s)) => Ok(s.clone()),
            _ => Err(JobError::FieldMissing(field)),
        }
    }

    fn amount(&self, field: PresetField) -> Result<u64, JobError> {
        match self.preset(field) {
            Some(FieldValue::Speed(n)) | Some(FieldValue::Size(n)) => Ok(*n),
            _ => Err(JobError::FieldMissing(field)),
        }
    }

    fn eta(&self) -> Result<Eta, JobError> {
        match self.preset(PresetField::Eta) {
            Some(FieldValue::Seconds(eta)) => Ok(*eta),
            _ => Err(JobError::FieldMissing(PresetField::Eta)),
        }
    }
}

/// Validated projection of a [`JobRaw`], ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobViewModel {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub raw_status: String,
    pub upload_speed: u64,
    pub download_speed: u64,
    pub uploaded: u64,
    pub downloaded: u64,
    pub size: u64,
    pub eta: Eta,
    /// Fraction in `0.0..=1.0`
    pub progress: f64,
    pub extra: IndexMap<String, FieldValue>,
}

impl JobViewModel {
    /// Every preset field must be present; an unmapped status code becomes
    /// [`Status::Unknown`].
    pub fn new(raw: &JobRaw, statuses: &StatusTable) -> Result<Self, JobError> {
        let raw_status = raw.text(PresetField::Status)?;
        let downloaded = raw.amount(PresetField::Downloaded)?;
        let size = raw.amount(PresetField::Size)?;

        let progress = if size == 0 {
            0.0
        } else {
            (downloaded as f64 / size as f64).min(1.0)
        };

        Ok(Self {
            id: raw.text(PresetField::Id)?,
            name: raw.text(PresetField::Name)?,
            status: statuses.status_for(&raw_status),
            raw_status,
            upload_speed: raw.amount(PresetField::UploadSpeed)?,
            download_speed: raw.amount(PresetField::DownloadSpeed)?,
            uploaded: raw.amount(PresetField::Uploaded)?,
            downloaded,
            size,
            eta: raw.eta()?,
            progress,
            extra: raw.ad_hoc.clone(),
        })
    }
}
