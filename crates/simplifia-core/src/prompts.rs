//! Prompt table — maps an explanation level to its system instruction.
//!
//! The table is literal data, built once and never mutated. Keys are
//! normalized (trimmed, lowercased) before lookup so `"Enfant"` and
//! `" enfant "` resolve like `"enfant"`. Unknown levels fall back to the
//! génie prompt.

// ─────────────────────────────────────────────
// Level specs
// ─────────────────────────────────────────────

/// One entry of the prompt table.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSpec {
    /// Lookup key sent by clients (e.g. `"enfant"`).
    pub key: &'static str,
    /// Human-readable label for listings.
    pub label: &'static str,
    /// System instruction sent to the provider.
    pub instruction: &'static str,
}

/// Key of the level used when a lookup misses.
pub const DEFAULT_LEVEL: &str = "genie";

pub const CHILD_PROMPT: &str = "Tu es un instituteur de maternelle. Explique le concept à un enfant de 5 ans de manière très simple. Utilise des analogies avec des jouets, des animaux ou des bonbons. Fais des phrases très courtes.";

pub const TEEN_PROMPT: &str = "Tu es un grand frère ou une grande sœur cool. Explique ça simplement à un adolescent mais sans être bébé, utilise des exemples de la vie courante (jeux vidéo, réseaux sociaux, sport).";

pub const STUDENT_PROMPT: &str = "Tu es un professeur d'université pédagogue. Explique le concept de manière académique mais vulgarisée. Utilise un ton sérieux, structure tes idées avec des points clés, mais évite le jargon inutile.";

pub const GENIUS_PROMPT: &str = "Tu t'adresses à un expert qui veut une nouvelle perspective. N'utilise aucun terme technique du domaine. Explique tout le concept uniquement à travers une métaphore complexe et filée.";

pub const ADAPTIVE_PROMPT: &str = "Tu es un pédagogue adaptatif. Commence par une explication en une phrase accessible à tous, puis approfondis progressivement en trois paliers (débutant, intermédiaire, avancé). Termine par une analogie mémorable et une question pour vérifier la compréhension.";

static LEVELS: &[LevelSpec] = &[
    LevelSpec {
        key: "enfant",
        label: "👶 Enfant (5 ans)",
        instruction: CHILD_PROMPT,
    },
    LevelSpec {
        key: "ado",
        label: "😎 Adolescent",
        instruction: TEEN_PROMPT,
    },
    LevelSpec {
        key: "etudiant",
        label: "🎓 Étudiant",
        instruction: STUDENT_PROMPT,
    },
    LevelSpec {
        key: DEFAULT_LEVEL,
        label: "🧠 Génie",
        instruction: GENIUS_PROMPT,
    },
    LevelSpec {
        key: "bonus",
        label: "🧩 Adaptatif (Bonus)",
        instruction: ADAPTIVE_PROMPT,
    },
];

// ─────────────────────────────────────────────
// PromptTable
// ─────────────────────────────────────────────

/// Read-only level → instruction mapping, shared across requests.
#[derive(Clone, Debug)]
pub struct PromptTable {
    levels: &'static [LevelSpec],
    default: &'static LevelSpec,
}

impl Default for PromptTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptTable {
    /// The built-in table with the five levels.
    pub fn builtin() -> Self {
        let default = LEVELS
            .iter()
            .find(|l| l.key == DEFAULT_LEVEL)
            .unwrap_or(&LEVELS[0]);
        PromptTable {
            levels: LEVELS,
            default,
        }
    }

    /// Resolve a level to its instruction. Never fails.
    pub fn resolve(&self, level: &str) -> &'static str {
        self.find(level).unwrap_or(self.default).instruction
    }

    /// Find the level spec for a key, if it is one of the known levels.
    pub fn find(&self, level: &str) -> Option<&'static LevelSpec> {
        let key = normalize_level(level);
        self.levels.iter().find(|l| l.key == key)
    }

    /// All levels, in display order.
    pub fn levels(&self) -> &'static [LevelSpec] {
        self.levels
    }

    /// The fallback level.
    pub fn default_level(&self) -> &'static LevelSpec {
        self.default
    }
}

fn normalize_level(level: &str) -> String {
    level.trim().to_lowercase()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
