use super::*;

/// Local English noun generator backed by the `petname` word lists.
///
/// A one-word petname is always a noun. There is no German list, so German
/// requests fail with `Unsupported` and the caller falls back to the
/// built-in words.
#[derive(Debug, Default)]
pub struct PetnameWordSource;

impl PetnameWordSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WordSource for PetnameWordSource {
    async fn fetch_word(&self, language: Language) -> WordResult<String> {
        match language {
            Language::English => petname::petname(1, "").ok_or(WordSourceError::Empty),
            Language::German => Err(WordSourceError::Unsupported(language)),
        }
    }

    fn name(&self) -> &str {
        "petname"
    }
}
