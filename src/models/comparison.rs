// file: src/models/comparison.rs
// description: comparison matrix and structured profile models
// reference: internal data structures

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AspectFinding {
    Extracted(String),
    NotFound,
    Failed(String),
}

impl AspectFinding {
    pub fn display_text(&self) -> String {
        match self {
            Self::Extracted(text) => text.clone(),
            Self::NotFound => "Document not found".to_string(),
            Self::Failed(message) => format!("Error: {}", message),
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectComparison {
    pub aspect: String,
    /// Findings in the order the documents were requested.
    pub findings: Vec<(String, AspectFinding)>,
}

impl AspectComparison {
    pub fn finding(&self, doc_id: &str) -> Option<&AspectFinding> {
        self.findings
            .iter()
            .find(|(id, _)| id == doc_id)
            .map(|(_, finding)| finding)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    pub doc_ids: Vec<String>,
    pub aspects: Vec<AspectComparison>,
}

impl ComparisonMatrix {
    pub fn new(doc_ids: Vec<String>) -> Self {
        Self {
            doc_ids,
            aspects: Vec::new(),
        }
    }

    pub fn aspect(&self, name: &str) -> Option<&AspectComparison> {
        self.aspects.iter().find(|a| a.aspect == name)
    }

    pub fn failure_count(&self) -> usize {
        self.aspects
            .iter()
            .flat_map(|a| a.findings.iter())
            .filter(|(_, f)| !f.is_extracted())
            .count()
    }
}

fn na() -> String {
    "N/A".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProfile {
    #[serde(default = "na", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default = "na", deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default = "na", deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_years")]
    pub experience_years: u32,
    #[serde(default, deserialize_with = "lenient_list")]
    pub education: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_achievements: Vec<String>,
}

impl Default for StructuredProfile {
    fn default() -> Self {
        Self {
            name: na(),
            email: na(),
            phone: na(),
            skills: Vec::new(),
            experience_years: 0,
            education: Vec::new(),
            certifications: Vec::new(),
            key_achievements: Vec::new(),
        }
    }
}

fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a")
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !is_placeholder(&s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => na(),
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !is_placeholder(s))
        .collect())
}

fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v as u32)
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u32))
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    })
}

/// Result of asking the model for a structured profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileOutcome {
    Parsed { profile: StructuredProfile },
    Unparsed { raw_response: String },
    Failed { error: String },
}

impl ProfileOutcome {
    pub fn profile(&self) -> Option<&StructuredProfile> {
        match self {
            Self::Parsed { profile } => Some(profile),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_lenient_parsing() {
        let json = r#"{
            "name": "Jane Doe",
            "email": "N/A",
            "phone": null,
            "skills": ["Rust", "  ", "Python"],
            "experience_years": "7+",
            "education": "BSc CS, MSc AI",
            "key_achievements": ["Shipped v1"]
        }"#;

        let profile: StructuredProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.email, "N/A");
        assert_eq!(profile.phone, "N/A");
        assert_eq!(profile.skills, vec!["Rust".to_string(), "Python".to_string()]);
        assert_eq!(profile.experience_years, 7);
        assert_eq!(profile.education, vec!["BSc CS".to_string(), "MSc AI".to_string()]);
        assert!(profile.certifications.is_empty());
    }

    #[test]
    fn test_profile_numeric_years() {
        let profile: StructuredProfile =
            serde_json::from_str(r#"{"experience_years": 4.5}"#).unwrap();
        assert_eq!(profile.experience_years, 4);

        let profile: StructuredProfile =
            serde_json::from_str(r#"{"experience_years": "N/A"}"#).unwrap();
        assert_eq!(profile.experience_years, 0);
    }

    #[test]
    fn test_matrix_lookup() {
        let mut matrix = ComparisonMatrix::new(vec!["a".to_string(), "b".to_string()]);
        matrix.aspects.push(AspectComparison {
            aspect: "skills".to_string(),
            findings: vec![
                ("a".to_string(), AspectFinding::Extracted("- Rust".to_string())),
                ("b".to_string(), AspectFinding::NotFound),
            ],
        });

        let aspect = matrix.aspect("skills").unwrap();
        assert_eq!(aspect.finding("b"), Some(&AspectFinding::NotFound));
        assert_eq!(matrix.failure_count(), 1);
        assert_eq!(
            AspectFinding::Failed("boom".to_string()).display_text(),
            "Error: boom"
        );
    }
}
