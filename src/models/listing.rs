use std::fmt;

use serde::Serialize;

use crate::dates::DeadlineValue;

/// Fields read from a listing detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
    Deadline,
    Experience,
    Skills,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Company => "company",
            Field::Location => "location",
            Field::Deadline => "deadline",
            Field::Experience => "experience",
            Field::Skills => "skills",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One harvested job posting. Starts with only `url`; absent fields
/// serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub url: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<DeadlineValue>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
}

impl JobListing {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            company: None,
            location: None,
            deadline: None,
            experience: None,
            skills: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_listing_serializes_absent_fields_as_null() {
        let listing = JobListing::new("https://example.com/wd/1");
        assert_eq!(
            serde_json::to_value(&listing).unwrap(),
            json!({
                "url": "https://example.com/wd/1",
                "title": null,
                "company": null,
                "location": null,
                "deadline": null,
                "experience": null,
                "skills": [],
            })
        );
    }

    #[test]
    fn test_deadline_serializes_as_number_or_text() {
        let mut listing = JobListing::new("u");
        listing.deadline = Some(DeadlineValue::Timestamp(1_728_053_940));
        assert_eq!(serde_json::to_value(&listing).unwrap()["deadline"], 1_728_053_940);

        listing.deadline = Some(DeadlineValue::Text("상시채용".into()));
        assert_eq!(serde_json::to_value(&listing).unwrap()["deadline"], "상시채용");
    }
}
