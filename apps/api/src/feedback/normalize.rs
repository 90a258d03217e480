use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::feedback::{Feedback, FeedbackSection, FeedbackTip, TipType};

const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;
const TAILORING_EXPLANATION: &str = "Tailor this section for better alignment.";
const FOUND_KEYWORD_EXPLANATION: &str = "Relevant keyword present.";
const MISSING_KEYWORD_EXPLANATION: &str = "Consider adding where appropriate.";

/// Older flat shape some stored analyses still use.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyFeedback {
    ats_score: Option<f64>,
    key_strengths: Option<Vec<String>>,
    key_weaknesses: Option<Vec<String>>,
    keyword_analysis: Option<KeywordAnalysis>,
    tailoring_suggestions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct KeywordAnalysis {
    #[serde(default)]
    found: Vec<String>,
    #[serde(default)]
    missing: Vec<String>,
}

/// Reshapes model output into `Feedback`.
///
/// Accepts a JSON string (optionally fenced in a markdown code block) or an
/// already-parsed value. Anything that does not validate yields
/// `Feedback::default()`; this never fails.
pub fn normalize_feedback(raw: &Value) -> Feedback {
    let value = match raw {
        Value::String(text) => match serde_json::from_str::<Value>(strip_json_fences(text)) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not parse feedback text: {e}");
                return Feedback::default();
            }
        },
        other => other.clone(),
    };

    let Some(object) = value.as_object() else {
        return Feedback::default();
    };

    let result = if object.contains_key("ATS") && object.contains_key("overallScore") {
        serde_json::from_value::<Feedback>(value).map_err(|e| e.to_string())
    } else {
        serde_json::from_value::<LegacyFeedback>(value)
            .map(from_legacy)
            .map_err(|e| e.to_string())
    };

    match result.and_then(validate_scores) {
        Ok(feedback) => feedback,
        Err(e) => {
            warn!("Feedback failed validation: {e}");
            Feedback::default()
        }
    }
}

fn from_legacy(legacy: LegacyFeedback) -> Feedback {
    let score = legacy.ats_score.unwrap_or(0.0);
    let keywords = legacy.keyword_analysis.unwrap_or_default();

    let ats_tips = legacy
        .key_strengths
        .unwrap_or_default()
        .into_iter()
        .map(|tip| make_tip(TipType::Good, tip, ""))
        .chain(
            legacy
                .key_weaknesses
                .unwrap_or_default()
                .into_iter()
                .map(|tip| make_tip(TipType::Improve, tip, "")),
        )
        .collect();

    let content_tips = legacy
        .tailoring_suggestions
        .unwrap_or_default()
        .into_iter()
        .map(|tip| make_tip(TipType::Improve, tip, TAILORING_EXPLANATION))
        .collect();

    let skills_tips = keywords
        .found
        .into_iter()
        .map(|k| {
            make_tip(
                TipType::Good,
                format!("Includes keyword: {k}"),
                FOUND_KEYWORD_EXPLANATION,
            )
        })
        .chain(keywords.missing.into_iter().map(|k| {
            make_tip(
                TipType::Improve,
                format!("Missing keyword: {k}"),
                MISSING_KEYWORD_EXPLANATION,
            )
        }))
        .collect();

    Feedback {
        overall_score: score,
        ats: FeedbackSection {
            score,
            tips: ats_tips,
        },
        content: FeedbackSection {
            score,
            tips: content_tips,
        },
        skills: FeedbackSection {
            score,
            tips: skills_tips,
        },
        ..Feedback::default()
    }
}

fn make_tip(kind: TipType, tip: String, explanation: &str) -> FeedbackTip {
    FeedbackTip {
        kind,
        tip,
        explanation: explanation.to_string(),
    }
}

fn validate_scores(feedback: Feedback) -> Result<Feedback, String> {
    if !SCORE_RANGE.contains(&feedback.overall_score) {
        return Err(format!(
            "overallScore {} is outside 0-100",
            feedback.overall_score
        ));
    }
    if let Some(section) = feedback
        .sections()
        .into_iter()
        .find(|s| !SCORE_RANGE.contains(&s.score))
    {
        return Err(format!("section score {} is outside 0-100", section.score));
    }
    Ok(feedback)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let rest = rest.trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
