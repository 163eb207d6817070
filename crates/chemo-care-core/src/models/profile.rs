//! Patient profile models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Profile validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid gender: {0:?}")]
    InvalidGender(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ProfileError::InvalidGender(s.to_string())),
        }
    }
}

/// The patient's demographic and treatment metadata. One per installation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default, deserialize_with = "number_or_text")]
    pub age: Option<u32>,
    pub gender: Gender,
    /// Body weight in kg
    #[serde(rename = "weight", default, deserialize_with = "number_or_text")]
    pub weight_kg: Option<f64>,
    /// Height in cm
    #[serde(rename = "height", default, deserialize_with = "number_or_text")]
    pub height_cm: Option<f64>,
    /// Diagnosis, e.g. "Breast Cancer"
    pub disease_type: String,
    /// Regimen, e.g. "TC", "AC-T"
    pub chemo_scheme: String,
    /// First day of treatment
    pub start_date: NaiveDate,
}

impl UserProfile {
    /// First word of the name, used for the dashboard greeting.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// Raw onboarding form input. Every field is free text until validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub weight: String,
    pub height: String,
    pub disease_type: String,
    pub chemo_scheme: String,
    pub start_date: String,
}

impl TryFrom<ProfileDraft> for UserProfile {
    type Error = ProfileError;

    fn try_from(draft: ProfileDraft) -> Result<Self, Self::Error> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ProfileError::MissingField("name"));
        }
        let disease_type = draft.disease_type.trim();
        if disease_type.is_empty() {
            return Err(ProfileError::MissingField("diseaseType"));
        }

        let age = match draft.age.trim() {
            "" => None,
            s => Some(s.parse::<u32>().map_err(|_| ProfileError::InvalidNumber {
                field: "age",
                value: draft.age.clone(),
            })?),
        };

        let gender = if draft.gender.trim().is_empty() {
            Gender::default()
        } else {
            draft.gender.parse()?
        };

        let start_date = NaiveDate::parse_from_str(draft.start_date.trim(), "%Y-%m-%d")
            .map_err(|_| ProfileError::InvalidDate(draft.start_date.clone()))?;

        Ok(UserProfile {
            name: name.to_string(),
            age,
            gender,
            weight_kg: parse_measure("weight", &draft.weight)?,
            height_cm: parse_measure("height", &draft.height)?,
            disease_type: disease_type.to_string(),
            chemo_scheme: draft.chemo_scheme.trim().to_string(),
            start_date,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Accepts `52`, `"52"`, `""` or `null`. Older profiles stored the form text as-is.
fn number_or_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid number: {:?}", text)))
        }
    }
}

/// Blank means "not given"; anything else must be a finite, non-negative number.
fn parse_measure(field: &'static str, raw: &str) -> Result<Option<f64>, ProfileError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(ProfileError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
