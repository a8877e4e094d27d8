use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

const ENGLISH_WORDS: &[&str] = &[
    "apple", "banana", "computer", "bicycle", "mountain", "ocean", "elephant", "guitar",
    "umbrella", "window", "pizza", "castle", "beach", "forest", "island", "library", "coffee",
    "airplane", "camera", "telephone", "diamond", "fountain", "keyboard", "painting",
];

const GERMAN_WORDS: &[&str] = &[
    "Apfel",
    "Banane",
    "Computer",
    "Fahrrad",
    "Berg",
    "Ozean",
    "Elefant",
    "Gitarre",
    "Regenschirm",
    "Fenster",
    "Pizza",
    "Schloss",
    "Strand",
    "Wald",
    "Insel",
    "Bibliothek",
    "Kaffee",
    "Flugzeug",
    "Kamera",
    "Telefon",
    "Diamant",
    "Brunnen",
    "Tastatur",
    "Gemälde",
];

/// Built-in nouns for a language; never empty
pub fn builtin_words(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => ENGLISH_WORDS,
        Language::German => GERMAN_WORDS,
    }
}

/// Draws uniformly from the built-in lists
pub struct StaticWordSource {
    rng: Mutex<StdRng>,
}

impl StaticWordSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for StaticWordSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WordSource for StaticWordSource {
    async fn fetch_word(&self, language: Language) -> WordResult<String> {
        let mut rng = self.rng.lock().await;
        builtin_words(language)
            .choose(&mut *rng)
            .map(|w| w.to_string())
            .ok_or(WordSourceError::Empty)
    }

    fn name(&self) -> &str {
        "static"
    }
}
