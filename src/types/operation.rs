use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical features exposed by a session, one per remote endpoint.
///
/// The string form is what call records and metric labels carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GenerateImage,
    EnhancePrompt,
    LifestyleShot,
    GenerativeFill,
    EraseForeground,
    AddShadow,
    CreatePackshot,
    DownloadImage,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Self::GenerateImage,
        Self::EnhancePrompt,
        Self::LifestyleShot,
        Self::GenerativeFill,
        Self::EraseForeground,
        Self::AddShadow,
        Self::CreatePackshot,
        Self::DownloadImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateImage => "generate_image",
            Self::EnhancePrompt => "enhance_prompt",
            Self::LifestyleShot => "lifestyle_shot",
            Self::GenerativeFill => "generative_fill",
            Self::EraseForeground => "erase_foreground",
            Self::AddShadow => "add_shadow",
            Self::CreatePackshot => "create_packshot",
            Self::DownloadImage => "download_image",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_matches_serde() {
        for op in Operation::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
            assert_eq!(serde_json::from_str::<Operation>(&json).unwrap(), op);
            assert_eq!(op.to_string(), op.as_str());
        }
    }
}
