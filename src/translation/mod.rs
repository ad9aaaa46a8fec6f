//! Translation of finished summaries
//!
//! Translation never fails a summarization: when a translator returns `None`
//! the untranslated text is kept and a notice is attached instead.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::llm::RequestDispatcher;
use crate::summary::SummarizationResult;

/// Notice attached when some text could not be translated.
pub const TRANSLATION_UNAVAILABLE: &str = "Translation unavailable; showing original text.";

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`. `None` means translation is unavailable or failed.
    async fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> Option<String>;
}

/// Translator backed by the summarization provider.
pub struct LlmTranslator {
    dispatcher: RequestDispatcher,
    timeout: Duration,
}

impl LlmTranslator {
    pub fn new(dispatcher: RequestDispatcher, timeout: Duration) -> Self {
        Self {
            dispatcher,
            timeout,
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> Option<String> {
        if source_lang.trim().is_empty() || target_lang.trim().is_empty() || text.trim().is_empty()
        {
            debug!("Skipping translation of blank input");
            return None;
        }

        let prompt = translation_prompt(source_lang, target_lang, text);
        match self
            .dispatcher
            .dispatch(&prompt, &CancellationToken::new(), self.timeout)
            .await
        {
            Ok(translated) if !translated.trim().is_empty() => Some(translated.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Translation {} -> {} failed: {}", source_lang, target_lang, e);
                None
            }
        }
    }
}

fn translation_prompt(source_lang: &str, target_lang: &str, text: &str) -> String {
    format!(
        "Translate the following text from {source_lang} to {target_lang}. Keep markdown \
formatting. Reply with the translation only:\n\
{text}"
    )
}

/// A result after translation, with a notice if anything fell back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedResult {
    #[serde(flatten)]
    pub result: SummarizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Translate the summary and every takeaway, keeping originals on failure.
pub async fn translate_result(
    translator: &dyn Translator,
    source_lang: &str,
    target_lang: &str,
    result: SummarizationResult,
) -> TranslatedResult {
    // A takeaways-only answer has nothing to translate in the summary.
    let summary = if result.summary.trim().is_empty() {
        result.summary.clone()
    } else {
        match translator
            .translate(source_lang, target_lang, &result.summary)
            .await
        {
            Some(summary) => summary,
            None => {
                warn!("Summary translation unavailable, keeping original text");
                return TranslatedResult {
                    result,
                    notice: Some(TRANSLATION_UNAVAILABLE.to_string()),
                };
            }
        }
    };

    let mut fell_back = false;
    let mut takeaways = Vec::with_capacity(result.takeaways.len());
    for takeaway in result.takeaways {
        match translator.translate(source_lang, target_lang, &takeaway).await {
            Some(translated) => takeaways.push(translated),
            None => {
                fell_back = true;
                takeaways.push(takeaway);
            }
        }
    }

    TranslatedResult {
        result: SummarizationResult { summary, takeaways },
        notice: fell_back.then(|| TRANSLATION_UNAVAILABLE.to_string()),
    }
}
