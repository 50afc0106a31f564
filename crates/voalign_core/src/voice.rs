//! Voice selection.
//!
//! Personas are gender-scoped. Asking for a persona that belongs to the
//! other gender falls back to the requested gender's default persona, so a
//! gender switch never produces a mismatched voice.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Speaker gender for the narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Man,
    Woman,
}

impl Gender {
    /// Persona used when the requested one does not fit this gender.
    pub fn default_persona(&self) -> Persona {
        match self {
            Gender::Man => Persona::Narrator,
            Gender::Woman => Persona::Professional,
        }
    }

    /// Personas available to this gender.
    pub fn personas(&self) -> &'static [Persona] {
        match self {
            Gender::Man => &[Persona::Narrator, Persona::Authoritative],
            Gender::Woman => &[Persona::Professional, Persona::Dynamic],
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Man => write!(f, "man"),
            Gender::Woman => write!(f, "woman"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "man" | "male" | "m" => Ok(Gender::Man),
            "woman" | "female" | "f" | "w" => Ok(Gender::Woman),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Named voice style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Calm documentary narrator (man).
    Narrator,
    /// Firm, commanding delivery (man).
    Authoritative,
    /// Clear corporate presenter (woman).
    Professional,
    /// Energetic, upbeat delivery (woman).
    Dynamic,
}

impl Persona {
    /// Gender this persona belongs to.
    pub fn gender(&self) -> Gender {
        match self {
            Persona::Narrator | Persona::Authoritative => Gender::Man,
            Persona::Professional | Persona::Dynamic => Gender::Woman,
        }
    }

    /// Prebuilt synthesis voice backing this persona.
    pub fn voice_id(&self) -> &'static str {
        match self {
            Persona::Narrator => "Charon",
            Persona::Authoritative => "Fenrir",
            Persona::Professional => "Kore",
            Persona::Dynamic => "Zephyr",
        }
    }

    /// Short style hint included in synthesis instructions.
    pub fn style_hint(&self) -> &'static str {
        match self {
            Persona::Narrator => "warm, measured documentary narration",
            Persona::Authoritative => "firm, confident and commanding",
            Persona::Professional => "clear, polished presenter",
            Persona::Dynamic => "energetic and upbeat",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Persona::Narrator => "narrator",
            Persona::Authoritative => "authoritative",
            Persona::Professional => "professional",
            Persona::Dynamic => "dynamic",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrator" => Ok(Persona::Narrator),
            "authoritative" => Ok(Persona::Authoritative),
            "professional" => Ok(Persona::Professional),
            "dynamic" => Ok(Persona::Dynamic),
            other => Err(format!("unknown persona '{}'", other)),
        }
    }
}

/// Resolved voice for a synthesis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceIdentity {
    pub gender: Gender,
    pub persona: Persona,
    pub voice_id: &'static str,
}

/// Pick the voice for `gender`, honouring `persona` when it belongs to it.
pub fn select_voice(gender: Gender, persona: Persona) -> VoiceIdentity {
    let persona = if persona.gender() == gender {
        persona
    } else {
        gender.default_persona()
    };

    VoiceIdentity {
        gender,
        persona,
        voice_id: persona.voice_id(),
    }
}
