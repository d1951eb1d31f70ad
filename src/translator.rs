//! Translation of scraped chapters using OpenAI-compatible APIs.
//!
//! Provides text translation with streaming progress display,
//! message history management, and retry logic.

use crate::config::{ApiConfig, TranslationConfig};
use crate::console::Console;
use crate::error::TranslationError;
use crate::novel::{ChapterRecord, NovelDocument};
use crate::utils::{check_response_status, split_text_into_line_chunks};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// Refusal phrases that indicate the model declined to translate.
static REFUSAL_PHRASES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "i'm sorry",
        "i cannot",
        "i am unable",
        "as an ai",
        "my apologies",
        "i am not programmed",
        "i do not have the ability",
    ]
});

/// Marker prepended to chunks that could not be translated.
const FAILED_MARKER: &str = "[TRANSLATION FAILED]";

/// A message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the chat completions API.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
}

/// A single choice in a streamed response.
#[derive(Debug, Deserialize)]
struct Choice {
    delta: Option<Delta>,
}

/// Delta content in a streaming response.
#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Streaming chunk from the API.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<Choice>,
}

/// One parsed server-sent-events line.
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    /// Text appended by the model.
    Content(String),
    /// End of stream.
    Done,
    /// Comments, keep-alives and anything unparseable.
    Ignored,
}

/// Parses one `data: ...` line of a streamed chat completion.
fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.trim_end_matches('\r').strip_prefix("data:") else {
        return SseEvent::Ignored;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            let content: String = chunk
                .choices
                .into_iter()
                .filter_map(|choice| choice.delta.and_then(|d| d.content))
                .collect();
            if content.is_empty() {
                SseEvent::Ignored
            } else {
                SseEvent::Content(content)
            }
        }
        Err(_) => SseEvent::Ignored,
    }
}

/// Returns the refusal phrase a response starts with, if any.
fn refusal_phrase(response: &str) -> Option<&'static str> {
    let lower = response.trim().to_lowercase();
    REFUSAL_PHRASES
        .iter()
        .copied()
        .find(|phrase| lower.starts_with(phrase))
}

/// Keeps the system message and the last `pairs` user/assistant pairs.
fn trim_history(history: &mut Vec<Message>, pairs: usize) {
    let max_messages = 1 + pairs * 2;
    if history.len() > max_messages {
        let remove_count = history.len() - max_messages;
        history.drain(1..1 + remove_count);
    }
}

/// Replaces a chapter's paragraphs with translated lines.
fn apply_translation(chapter: &mut ChapterRecord, translated: &str) {
    chapter.content = Some(
        translated
            .split('\n')
            .map(|line| line.trim().to_string())
            .collect(),
    );
}

/// Translator for scraped novel chapters.
pub struct Translator {
    /// HTTP client for API requests.
    client: Client,
    /// API configuration.
    api_config: ApiConfig,
    /// Translation behavior configuration.
    translation_config: TranslationConfig,
    /// System prompt with the target language filled in.
    prompt: String,
    /// Console for output.
    console: Console,
}

impl Translator {
    /// Create a new Translator targeting `language`.
    pub fn new(
        api_config: ApiConfig,
        translation_config: TranslationConfig,
        language: &str,
        console: Console,
    ) -> Self {
        let prompt = translation_config.prompt_for(language);
        Self {
            client: Client::new(),
            api_config,
            translation_config,
            prompt,
            console,
        }
    }

    /// Translates the content of every chapter that has any.
    ///
    /// Returns the number of chapters translated.
    pub async fn translate_document(
        &self,
        document: &mut NovelDocument,
    ) -> Result<usize, TranslationError> {
        let total = document
            .info
            .chapters
            .iter()
            .filter(|ch| ch.has_content())
            .count();
        let mut translated_count = 0;

        for chapter in document
            .info
            .chapters
            .iter_mut()
            .filter(|ch| ch.has_content())
        {
            translated_count += 1;
            self.console.step(&format!(
                "{} Translating chapter: {}",
                self.console.chapter_position(translated_count, total),
                chapter.title
            ));

            let text = chapter.content.as_deref().unwrap_or_default().join("\n");
            let translated = self.translate(&text, translated_count).await?;
            apply_translation(chapter, &translated);
        }

        Ok(translated_count)
    }

    /// Translate text, chunked by lines.
    ///
    /// Chunks that still fail after all retries are kept untranslated behind
    /// a failure marker, so one bad chunk never loses a chapter.
    pub async fn translate(&self, text: &str, chapter: usize) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let chunks = split_text_into_line_chunks(text, self.translation_config.chunk_size_chars);
        let total_chunks = chunks.len();
        let mut results = Vec::with_capacity(total_chunks);
        let mut history = vec![Message::new("system", self.prompt.clone())];

        for (i, chunk) in chunks.iter().enumerate() {
            let label = self.console.chunk_info(chapter, i + 1, total_chunks);

            let mut attempt = 0;
            let mut last_error: Option<TranslationError> = None;

            while attempt < self.translation_config.retries {
                match self.translate_single_chunk(chunk, &mut history, &label).await {
                    Ok(translated) => {
                        results.push(translated);
                        last_error = None;
                        break;
                    }
                    Err(e) => {
                        last_error = Some(e);
                        attempt += 1;
                        if attempt < self.translation_config.retries {
                            // Exponential backoff
                            let delay = Duration::from_secs(2u64.pow(attempt));
                            self.console.warning(&format!(
                                "Translation failed, retrying in {:?} (attempt {}/{})",
                                delay,
                                attempt + 1,
                                self.translation_config.retries
                            ));
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }

            if let Some(e) = last_error {
                self.console
                    .error(&format!("Translation failed after all retries: {}", e));
                results.push(format!("{}\n{}", FAILED_MARKER, chunk));
            }
        }

        Ok(results.join("\n"))
    }

    /// Translate a single chunk of text.
    async fn translate_single_chunk(
        &self,
        chunk: &str,
        history: &mut Vec<Message>,
        label: &str,
    ) -> Result<String, TranslationError> {
        let mut messages = history.clone();
        messages.push(Message::new("user", chunk));

        let request = ChatRequest {
            model: &self.api_config.model,
            messages,
            stream: true,
        };

        let url = format!(
            "{}/chat/completions",
            self.api_config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_config.key)
            .json(&request)
            .send()
            .await?;
        let response = check_response_status(response).await?;

        let mut full_response = String::new();
        let mut pending: Vec<u8> = Vec::new();
        let start_time = Instant::now();
        let mut last_update = Instant::now();

        let mut stream = response.bytes_stream();

        // Events and UTF-8 sequences can straddle network chunks; only whole lines are parsed.
        'stream: while let Some(bytes) = stream.next().await {
            pending.extend_from_slice(&bytes?);

            while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                match parse_sse_line(&String::from_utf8_lossy(&line)) {
                    SseEvent::Content(content) => full_response.push_str(&content),
                    SseEvent::Done => break 'stream,
                    SseEvent::Ignored => {}
                }
            }

            if last_update.elapsed() >= Duration::from_secs(1) {
                self.display_progress(&full_response, start_time.elapsed(), label);
                last_update = Instant::now();
            }
        }

        if let SseEvent::Content(content) = parse_sse_line(&String::from_utf8_lossy(&pending)) {
            full_response.push_str(&content);
        }

        self.console.clear_line();

        let trimmed = full_response.trim().to_string();

        if trimmed.is_empty() {
            return Err(TranslationError::Refused("Empty response".to_string()));
        }

        if let Some(phrase) = refusal_phrase(&trimmed) {
            return Err(TranslationError::Refused(format!(
                "Response starts with refusal phrase: {}",
                phrase
            )));
        }

        history.push(Message::new("user", chunk));
        history.push(Message::new("assistant", trimmed.clone()));
        trim_history(history, self.translation_config.history_length);

        if let Ok(delay) =
            Duration::try_from_secs_f64(self.translation_config.delay_between_requests_sec)
            && !delay.is_zero()
        {
            tokio::time::sleep(delay).await;
        }

        Ok(trimmed)
    }

    /// Display progress during streaming.
    fn display_progress(&self, response: &str, elapsed: Duration, label: &str) {
        let char_count = response.chars().count();
        let speed = if elapsed.as_secs_f64() > 0.0 {
            char_count as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        // Last 50 chars, newlines replaced with spaces
        let preview: String = response
            .chars()
            .rev()
            .take(50)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();

        self.console.progress_update(&format!(
            "{} Progress: {} chars at {}. {}",
            label,
            self.console.count(char_count),
            self.console.speed(speed),
            self.console.muted(&format!("{}...", preview))
        ));
    }
}
