use serde::{Deserialize, Serialize};

/// How the user wants recommendations delivered: individual garments or
/// coordinated outfits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendMode {
    SingleItem,
    FullOutfit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
}

/// Structured representation of a free-text fashion request.
///
/// Derived once per request by the intent parser and immutable afterwards.
/// `semantic_query` is always populated; it falls back to the raw query text
/// when parsing fails or the model omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub language: Language,
    pub mode: RecommendMode,
    pub count: usize,
    pub garment_type: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub style: Option<String>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub semantic_query: String,
}

impl Intent {
    /// Soft-fallback intent used when the parsing call fails for any reason:
    /// search with the raw query in full-outfit mode.
    pub fn fallback(query: &str) -> Self {
        Self {
            language: Language::En,
            mode: RecommendMode::FullOutfit,
            count: 3,
            garment_type: None,
            category: None,
            gender: None,
            style: None,
            season: None,
            occasion: None,
            body_type: None,
            color: None,
            semantic_query: query.to_string(),
        }
    }
}

/// Fixed garment-type → catalog-category inference table.
pub fn infer_category(garment_type: &str) -> Option<&'static str> {
    match garment_type {
        "dress" | "jumpsuit" | "romper" => Some("dresses"),
        "top" | "blouse" | "shirt" | "t-shirt" | "sweater" | "jacket" | "coat" => {
            Some("upper_body")
        }
        "pants" | "jeans" | "shorts" | "skirt" => Some("lower_body"),
        _ => None,
    }
}

/// A garment fetched from the catalog for one request. Never cached across
/// requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarmentRecord {
    pub garment_id: String,
    pub description: String,
    /// 1 − distance, so higher is more similar.
    pub similarity_score: f32,
    pub category: Option<String>,
    pub garment_type: Option<String>,
    pub colors: Vec<String>,
    pub styles: Vec<String>,
    pub occasions: Vec<String>,
    pub image_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// An outfit candidate: either a top/bottom pairing or a standalone dress.
///
/// Across the candidate set generated for one request, no garment id appears
/// in more than one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutfitCandidate {
    TwoPiece {
        top: GarmentRecord,
        bottom: GarmentRecord,
    },
    Dress {
        dress: GarmentRecord,
    },
}

impl OutfitCandidate {
    pub fn garment_ids(&self) -> Vec<&str> {
        match self {
            Self::TwoPiece { top, bottom } => {
                vec![top.garment_id.as_str(), bottom.garment_id.as_str()]
            }
            Self::Dress { dress } => vec![dress.garment_id.as_str()],
        }
    }
}

/// An outfit candidate annotated with a ranking score and justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredOutfit {
    #[serde(flatten)]
    pub outfit: OutfitCandidate,
    /// Always within [0, 1].
    pub score: f32,
    /// May be empty when ranking was skipped or degraded.
    pub reason: String,
}

/// Final recommendation document, discriminated by `mode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecommendationResult {
    SingleItem {
        query: String,
        parsed_intent: Intent,
        num_results: usize,
        recommendations: Vec<GarmentRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stylist_advice: Option<String>,
    },
    FullOutfit {
        query: String,
        parsed_intent: Intent,
        num_outfits: usize,
        outfits: Vec<ScoredOutfit>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stylist_advice: Option<String>,
    },
}

/// Recommendation request, the tool-invocation surface.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default = "default_true")]
    pub include_reasoning: bool,
}

fn default_true() -> bool {
    true
}
