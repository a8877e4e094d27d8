use super::*;

/// Remote word source.
///
/// Sends `GET {url}?lang=<code>&number=1` and expects a JSON array of
/// strings, the shape served by common random-word APIs.
pub struct HttpWordSource {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpWordSource {
    pub fn new(url: String, timeout: Duration) -> WordResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WordSourceError::Request(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            url,
            timeout,
            client,
        })
    }
}

/// First non-blank word in a JSON array response
fn first_word(words: Vec<String>) -> WordResult<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_string())
        .find(|w| !w.is_empty())
        .ok_or(WordSourceError::Empty)
}

#[async_trait]
impl WordSource for HttpWordSource {
    async fn fetch_word(&self, language: Language) -> WordResult<String> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("lang", language.code()), ("number", "1")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WordSourceError::Timeout(self.timeout)
                } else {
                    WordSourceError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(WordSourceError::Request(format!(
                "Word API returned status {}",
                response.status()
            )));
        }

        let words: Vec<String> = response
            .json()
            .await
            .map_err(|e| WordSourceError::Parse(e.to_string()))?;

        first_word(words)
    }

    fn name(&self) -> &str {
        "http"
    }
}
