use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::api::types::{EmotionId, ViewportClass};

/// One emotion category (or the neutral spectrum) as the scene sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionDescriptor {
    /// Stable name, e.g. "serenity".
    pub id: String,
    /// Linear RGB.
    pub color: [f32; 3],
    pub anchor_desktop: Vec3,
    pub anchor_mobile: Vec3,
    pub scale_desktop: f32,
    pub scale_mobile: f32,
    /// The "spectrum" sphere: revealed last, has no particles of its own.
    #[serde(default)]
    pub neutral: bool,
}

impl EmotionDescriptor {
    #[inline]
    pub fn anchor(&self, class: ViewportClass) -> Vec3 {
        match class {
            ViewportClass::Desktop => self.anchor_desktop,
            ViewportClass::Mobile => self.anchor_mobile,
        }
    }

    #[inline]
    pub fn base_scale(&self, class: ViewportClass) -> f32 {
        match class {
            ViewportClass::Desktop => self.scale_desktop,
            ViewportClass::Mobile => self.scale_mobile,
        }
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    emotions: Vec<EmotionDescriptor>,
}

/// The fixed, validated list of emotions. Immutable once built.
#[derive(Debug, Clone)]
pub struct EmotionCatalog {
    emotions: Vec<EmotionDescriptor>,
    by_name: HashMap<String, EmotionId>,
    categories: Vec<EmotionId>,
    spectrum: EmotionId,
}

// name, color, desktop anchor, mobile anchor, desktop scale, mobile scale
type DefaultEntry = (&'static str, [f32; 3], [f32; 3], [f32; 3], f32, f32);

// Six categories on a ring of radius 3.2; mobile squeezes x and stretches y.
const DEFAULT_EMOTIONS: [DefaultEntry; 6] = [
    ("serenity", [0.45, 0.72, 0.95], [0.0, 3.2, 0.3], [0.0, 4.0, 0.3], 0.9, 0.7),
    ("vitality", [0.98, 0.62, 0.25], [2.77, 1.6, -0.3], [1.52, 2.0, -0.3], 0.9, 0.7),
    ("clarity", [0.55, 0.92, 0.85], [2.77, -1.6, 0.3], [1.52, -2.0, 0.3], 0.9, 0.7),
    ("gravity", [0.42, 0.36, 0.78], [0.0, -3.2, -0.3], [0.0, -4.0, -0.3], 0.9, 0.7),
    ("empathy", [0.95, 0.45, 0.62], [-2.77, -1.6, 0.3], [-1.52, -2.0, 0.3], 0.9, 0.7),
    ("curiosity", [0.98, 0.86, 0.35], [-2.77, 1.6, -0.3], [-1.52, 2.0, -0.3], 0.9, 0.7),
];

const DEFAULT_SPECTRUM: DefaultEntry = (
    "spectrum",
    [0.92, 0.92, 0.95],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    0.75,
    0.6,
);

fn descriptor_from(entry: &DefaultEntry, neutral: bool) -> EmotionDescriptor {
    let (id, color, desktop, mobile, scale_desktop, scale_mobile) = *entry;
    EmotionDescriptor {
        id: id.to_string(),
        color,
        anchor_desktop: Vec3::from_array(desktop),
        anchor_mobile: Vec3::from_array(mobile),
        scale_desktop,
        scale_mobile,
        neutral,
    }
}

impl EmotionCatalog {
    /// Build a catalog, checking ids, the neutral entry and numeric ranges.
    pub fn new(emotions: Vec<EmotionDescriptor>) -> Result<Self, ConfigError> {
        let neutral_count = emotions.iter().filter(|e| e.neutral).count();
        if neutral_count != 1 {
            return Err(ConfigError::NeutralCount(neutral_count));
        }
        if emotions.len() == neutral_count {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut by_name = HashMap::with_capacity(emotions.len());
        let mut categories = Vec::with_capacity(emotions.len() - 1);
        let mut spectrum = EmotionId(0);

        for (index, emotion) in emotions.iter().enumerate() {
            let id = EmotionId(index as u32);
            if by_name.insert(emotion.id.clone(), id).is_some() {
                return Err(ConfigError::DuplicateId(emotion.id.clone()));
            }
            let scales = [
                ("scale_desktop", emotion.scale_desktop),
                ("scale_mobile", emotion.scale_mobile),
            ];
            for (field, value) in scales {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::out_of_range(field, "finite and > 0", value as f64));
                }
            }
            if !emotion.anchor_desktop.is_finite() || !emotion.anchor_mobile.is_finite() {
                return Err(ConfigError::out_of_range("anchor", "finite", f64::NAN));
            }
            if emotion.neutral {
                spectrum = id;
            } else {
                categories.push(id);
            }
        }

        Ok(Self {
            emotions,
            by_name,
            categories,
            spectrum,
        })
    }

    /// Parse a catalog from a JSON string (`{ "emotions": [...] }`).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.emotions)
    }

    pub fn get(&self, id: EmotionId) -> Option<&EmotionDescriptor> {
        self.emotions.get(id.index())
    }

    /// Look up an emotion by name.
    pub fn find(&self, name: &str) -> Option<EmotionId> {
        self.by_name.get(name).copied()
    }

    /// Non-neutral categories in catalog order.
    pub fn categories(&self) -> &[EmotionId] {
        &self.categories
    }

    /// The neutral spectrum entry.
    pub fn spectrum(&self) -> EmotionId {
        self.spectrum
    }

    /// Categories in catalog order, then the neutral sphere.
    pub fn reveal_order(&self) -> impl Iterator<Item = EmotionId> + '_ {
        self.categories.iter().copied().chain(std::iter::once(self.spectrum))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionId, &EmotionDescriptor)> {
        self.emotions
            .iter()
            .enumerate()
            .map(|(i, e)| (EmotionId(i as u32), e))
    }

    pub fn len(&self) -> usize {
        self.emotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty()
    }
}

impl Default for EmotionCatalog {
    fn default() -> Self {
        let mut emotions: Vec<EmotionDescriptor> = DEFAULT_EMOTIONS
            .iter()
            .map(|entry| descriptor_from(entry, false))
            .collect();
        emotions.push(descriptor_from(&DEFAULT_SPECTRUM, true));

        let by_name = emotions
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), EmotionId(i as u32)))
            .collect();
        let categories = (0..DEFAULT_EMOTIONS.len() as u32).map(EmotionId).collect();
        let spectrum = EmotionId(DEFAULT_EMOTIONS.len() as u32);

        Self {
            emotions,
            by_name,
            categories,
            spectrum,
        }
    }
}
