use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipType {
    Good,
    #[default]
    Improve,
    Warning,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTip {
    #[serde(rename = "type", default)]
    pub kind: TipType,
    #[serde(default)]
    pub tip: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSection {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub tips: Vec<FeedbackTip>,
}

/// Fixed résumé feedback structure. `Default` is the all-zero fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default)]
    pub overall_score: f64,
    #[serde(rename = "ATS", default)]
    pub ats: FeedbackSection,
    #[serde(default)]
    pub tone_and_style: FeedbackSection,
    #[serde(default)]
    pub content: FeedbackSection,
    #[serde(default)]
    pub structure: FeedbackSection,
    #[serde(default)]
    pub skills: FeedbackSection,
}

impl Feedback {
    pub fn sections(&self) -> [&FeedbackSection; 5] {
        [
            &self.ats,
            &self.tone_and_style,
            &self.content,
            &self.structure,
            &self.skills,
        ]
    }
}
