use serde::{Deserialize, Serialize};

/// Content categories the generation service can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Response-safety thresholds sent along with every generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafetyPolicy(Vec<SafetySetting>);

impl SafetyPolicy {
    pub fn new(settings: Vec<SafetySetting>) -> Self {
        Self(settings)
    }

    /// Applies a single threshold to every known category
    pub fn uniform(threshold: HarmBlockThreshold) -> Self {
        Self(
            [
                HarmCategory::HarmCategoryHarassment,
                HarmCategory::HarmCategoryHateSpeech,
                HarmCategory::HarmCategorySexuallyExplicit,
                HarmCategory::HarmCategoryDangerousContent,
            ]
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold,
            })
            .collect(),
        )
    }

    pub fn settings(&self) -> &[SafetySetting] {
        &self.0
    }
}

impl Default for SafetyPolicy {
    /// Blocks medium-and-above severity for harassment, hate speech,
    /// sexual and dangerous content.
    fn default() -> Self {
        Self::uniform(HarmBlockThreshold::BlockMediumAndAbove)
    }
}
