//! Multi-step conversational forms.
//!
//! A [`FormSession`] walks the user through a fixed, ordered list of fields.
//! Each answer is validated before the session advances; once the last field
//! is accepted the session yields a confirmation and returns to idle in the
//! same transition.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::validation::{format_date, parse_date_relative_to, validate_email, validate_phone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Callback,
    Appointment,
}

impl FormKind {
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::Callback => &[Field::Name, Field::Phone, Field::Email],
            Self::Appointment => &[Field::Date, Field::Time],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Callback => "callback",
            Self::Appointment => "appointment",
        }
    }

    fn confirmation(&self, values: &BTreeMap<Field, String>) -> String {
        let get = |field: Field| values.get(&field).map(String::as_str).unwrap_or_default();
        match self {
            Self::Callback => format!(
                "Thank you, {}. We will contact you at {} or via {}.",
                get(Field::Name),
                get(Field::Phone),
                get(Field::Email)
            ),
            Self::Appointment => format!(
                "Your appointment has been scheduled for {} at {}.",
                get(Field::Date),
                get(Field::Time)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Phone,
    Email,
    Date,
    Time,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Date => "date",
            Self::Time => "time",
        }
    }

    /// Validates a raw answer, returning the value to store on success and the
    /// field-specific error message otherwise.
    pub fn validate(&self, input: &str, today: NaiveDate) -> Result<String, &'static str> {
        let trimmed = input.trim();
        match self {
            Self::Name | Self::Time => {
                if trimmed.is_empty() {
                    Err(self.error_message())
                } else {
                    Ok(trimmed.to_string())
                }
            }
            // Phone and email must match as typed, surrounding whitespace included.
            Self::Phone if validate_phone(input) => Ok(input.to_string()),
            Self::Email if validate_email(input) => Ok(input.to_string()),
            Self::Date => parse_date_relative_to(trimmed, today)
                .map(format_date)
                .ok_or(self.error_message()),
            Self::Phone | Self::Email => Err(self.error_message()),
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Self::Name => "Please enter your name.",
            Self::Phone => "Invalid phone number. Please enter a valid 10-digit phone number.",
            Self::Email => "Invalid email address. Please enter a valid email address.",
            Self::Date => {
                "Invalid date. Please provide a valid date or relative date (e.g., 'next Monday')."
            }
            Self::Time => "Please enter a time for your appointment.",
        }
    }

    fn prompt(&self, collected: &HashMap<Field, String>) -> String {
        match self {
            Self::Name => "Please enter your name:".to_string(),
            Self::Phone => "Please enter your phone number:".to_string(),
            Self::Email => "Please enter your email address:".to_string(),
            Self::Date => {
                "Please enter the date for your appointment (e.g., 'next Monday'):".to_string()
            }
            Self::Time => match collected.get(&Field::Date) {
                Some(date) => format!("Please enter the time for your appointment on {date}:"),
                None => "Please enter the time for your appointment:".to_string(),
            },
        }
    }
}

/// Completed form data handed back with the confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub kind: FormKind,
    pub values: BTreeMap<Field, String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The session was idle and now waits for its first field.
    Started { field: Field, prompt: String },
    /// The answer was rejected; the same field is asked again.
    Rejected { field: Field, error: String },
    /// The answer was accepted and the next field is due.
    Advanced { field: Field, prompt: String },
    /// The last field was accepted; the session is idle again.
    Completed {
        confirmation: String,
        record: FormRecord,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSession {
    kind: FormKind,
    current_step: Option<usize>,
    collected: HashMap<Field, String>,
    updated_at: DateTime<Utc>,
}

impl FormSession {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            current_step: None,
            collected: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn callback() -> Self {
        Self::new(FormKind::Callback)
    }

    pub fn appointment() -> Self {
        Self::new(FormKind::Appointment)
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &'static [Field] {
        self.kind.fields()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn current_field(&self) -> Option<Field> {
        self.current_step.and_then(|step| self.fields().get(step).copied())
    }

    pub fn collected(&self) -> &HashMap<Field, String> {
        &self.collected
    }

    pub fn is_idle(&self) -> bool {
        self.current_step.is_none()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Prompt for the field currently awaited, if any.
    pub fn current_prompt(&self) -> Option<String> {
        self.current_field().map(|field| field.prompt(&self.collected))
    }

    /// Feeds one user answer into the session, resolving relative dates
    /// against the local calendar.
    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        self.submit_at(input, Local::now().date_naive())
    }

    pub fn submit_at(&mut self, input: &str, today: NaiveDate) -> SubmitOutcome {
        let Some(field) = self.current_field() else {
            return self.start();
        };

        let value = match field.validate(input, today) {
            Ok(value) => value,
            Err(error) => {
                return SubmitOutcome::Rejected {
                    field,
                    error: error.to_string(),
                }
            }
        };

        self.collected.insert(field, value);
        self.updated_at = Utc::now();
        let next_step = self.current_step.map_or(0, |step| step + 1);

        match self.fields().get(next_step) {
            Some(next) => {
                self.current_step = Some(next_step);
                SubmitOutcome::Advanced {
                    field: *next,
                    prompt: next.prompt(&self.collected),
                }
            }
            None => self.complete(),
        }
    }

    pub fn reset(&mut self) {
        self.current_step = None;
        self.collected.clear();
        self.updated_at = Utc::now();
    }

    /// An in-progress session untouched for longer than `ttl` is stale.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.is_idle() && now - self.updated_at > ttl
    }

    fn start(&mut self) -> SubmitOutcome {
        self.collected.clear();
        self.current_step = Some(0);
        self.updated_at = Utc::now();
        let field = self.fields()[0];
        SubmitOutcome::Started {
            field,
            prompt: field.prompt(&self.collected),
        }
    }

    fn complete(&mut self) -> SubmitOutcome {
        let values: BTreeMap<Field, String> = self.collected.drain().collect();
        let confirmation = self.kind.confirmation(&values);
        self.reset();
        SubmitOutcome::Completed {
            confirmation,
            record: FormRecord {
                kind: self.kind,
                values,
                completed_at: Utc::now(),
            },
        }
    }
}
