//! Command dispatch state machine.
//!
//! Every invocation moves through Received -> Validated -> (Blocked |
//! Forwarded) -> Responded. The responder types enforce the response
//! protocol: the initial response consumes the responder and yields a
//! single-use follow-up handle, so an invocation can neither answer twice
//! nor follow up before answering.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::backend::{OutboundGate, TriggerPayload};
use crate::common::error::{CommandError, GatewayResult};
use crate::moderation::{ModerationPipeline, Tier, Verdict};
use crate::store::{AddOutcome, FilterStore, RemoveOutcome};

/// Generic failure text; internal causes are logged, never shown.
const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";
const PERMISSION_DENIED: &str = "You need administrator permission to manage the filter list.";
const BATCH_VALIDATION_FAILED: &str =
    "The file must contain comma-separated alphanumeric words.";

/// A command invocation received from the gateway layer.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub guild_id: u64,
    pub channel_id: u64,
    /// Mention string for the invoking user, e.g. "<@123>".
    pub user_mention: String,
    /// Whether the invoker holds administrator permission in the guild.
    pub invoker_is_admin: bool,
    pub command: Command,
}

/// Commands the bot understands.
#[derive(Debug, Clone)]
pub enum Command {
    /// Trigger a course-generation job.
    Learn { course: String },
    /// Add one word to the guild's filter list.
    AddFilter { word: String },
    /// Remove one word from the guild's filter list.
    RemoveFilter { word: String },
    /// Add a comma-separated batch of words from an uploaded file.
    AddFilterBatch { contents: String },
    /// Remove a comma-separated batch of words from an uploaded file.
    RemoveFilterBatch { contents: String },
    /// Show the guild's filter list.
    ViewFilter,
}

/// One user-visible reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Ephemeral replies are visible only to the invoker.
    pub ephemeral: bool,
}

impl Reply {
    /// A reply visible to the whole channel.
    pub fn channel(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: false,
        }
    }

    /// A reply visible only to the invoker.
    pub fn private(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

/// Sends the initial response for an invocation.
///
/// Consumed by `send_initial`; the returned handle is the only way to send
/// a follow-up.
#[async_trait]
pub trait Responder: Send {
    async fn send_initial(self: Box<Self>, reply: Reply) -> GatewayResult<Box<dyn Followup>>;
}

/// Sends the single follow-up message of a deferred invocation.
#[async_trait]
pub trait Followup: Send {
    async fn send(self: Box<Self>, text: String) -> GatewayResult<()>;
}

/// Routes invocations to moderation, the filter store, and the outbound gate.
pub struct CommandDispatcher {
    pipeline: ModerationPipeline,
    store: FilterStore,
    gate: Arc<OutboundGate>,
}

impl CommandDispatcher {
    pub fn new(pipeline: ModerationPipeline, store: FilterStore, gate: Arc<OutboundGate>) -> Self {
        Self {
            pipeline,
            store,
            gate,
        }
    }

    /// Handle one invocation, producing exactly one reply (plus at most one
    /// follow-up for the `learn` slow path).
    pub async fn dispatch(&self, invocation: Invocation, responder: Box<dyn Responder>) {
        if let Err(e) = self.run(invocation, responder).await {
            // The reply itself could not be delivered; nothing more to do.
            warn!("Failed to deliver command response: {}", e);
        }
    }

    async fn run(&self, invocation: Invocation, responder: Box<dyn Responder>) -> GatewayResult<()> {
        match invocation.command.clone() {
            Command::Learn { course } => self.run_learn(&invocation, &course, responder).await,
            command => {
                let text = match self.run_filter_command(&invocation, &command).await {
                    Ok(text) => text,
                    Err(CommandError::PermissionDenied) => {
                        info!(
                            "Denied filter command in guild {} (missing administrator)",
                            invocation.guild_id
                        );
                        PERMISSION_DENIED.to_string()
                    }
                    Err(CommandError::ValidationFailed { message }) => message,
                    Err(CommandError::Store(e)) => {
                        error!(
                            "Filter store failure in guild {}: {}",
                            invocation.guild_id, e
                        );
                        GENERIC_FAILURE.to_string()
                    }
                };
                responder.send_initial(Reply::private(text)).await?;
                Ok(())
            }
        }
    }

    /// The `learn` path: moderation, immediate acknowledgement, then the
    /// gated backend call with its result as the follow-up.
    async fn run_learn(
        &self,
        invocation: &Invocation,
        course: &str,
        responder: Box<dyn Responder>,
    ) -> GatewayResult<()> {
        let verdict = match self.pipeline.classify(course, invocation.guild_id).await {
            Ok(verdict) => verdict,
            Err(e) => {
                // Fail closed: a store outage must not let text through.
                error!(
                    "Moderation check failed for guild {}: {}",
                    invocation.guild_id, e
                );
                responder
                    .send_initial(Reply::channel(GENERIC_FAILURE))
                    .await?;
                return Ok(());
            }
        };

        if let Verdict::Blocked { tier, word } = verdict {
            info!(
                "Blocked course request in guild {} ({:?} tier, word '{}')",
                invocation.guild_id, tier, word
            );
            let text = match tier {
                Tier::Default => format!(
                    "The course description contains prohibited language: '{}'. Please try again.",
                    word
                ),
                Tier::Custom => format!(
                    "The course description contains a prohibited word: '{}'. Please try again.",
                    word
                ),
            };
            responder.send_initial(Reply::channel(text)).await?;
            return Ok(());
        }

        // Acknowledge before triggering: the backend call can easily outlast
        // the platform's immediate-response window.
        let ack = format!(
            "{} Generating course: {}...",
            invocation.user_mention, course
        );
        let followup = responder.send_initial(Reply::channel(ack)).await?;

        let payload = TriggerPayload {
            course_description: course.to_string(),
            channel_id: invocation.channel_id,
            mention: invocation.user_mention.clone(),
        };

        match self.gate.trigger(&payload).await {
            Ok(Some(body)) => followup.send(body).await,
            Ok(None) => Ok(()),
            Err(e) => {
                warn!("Backend trigger failed: {}", e);
                followup.send(GENERIC_FAILURE.to_string()).await
            }
        }
    }

    /// Synchronous filter commands: one store operation, one formatted reply.
    ///
    /// Every filter command mutates or reveals guild state, so all of them
    /// require administrator permission; the check runs before any store
    /// access.
    async fn run_filter_command(
        &self,
        invocation: &Invocation,
        command: &Command,
    ) -> Result<String, CommandError> {
        if !invocation.invoker_is_admin {
            return Err(CommandError::PermissionDenied);
        }

        let guild_id = invocation.guild_id;
        match command {
            Command::AddFilter { word } => Ok(match self.store.add(guild_id, word).await? {
                AddOutcome::Created => format!("'{}' has been added to the filter list.", word),
                AddOutcome::AlreadyExists => {
                    format!("'{}' is already in the filter list.", word)
                }
            }),
            Command::RemoveFilter { word } => {
                Ok(match self.store.remove(guild_id, word).await? {
                    RemoveOutcome::Removed => {
                        format!("'{}' has been removed from the filter list.", word)
                    }
                    RemoveOutcome::NotFound => {
                        format!("'{}' is not in the filter list.", word)
                    }
                })
            }
            Command::AddFilterBatch { contents } => {
                let words = parse_batch_tokens(contents)?;
                let added = self.store.add_batch(guild_id, &words).await?;
                Ok(format!("Added {} word(s) to the filter list.", added))
            }
            Command::RemoveFilterBatch { contents } => {
                let words = parse_batch_tokens(contents)?;
                let removed = self.store.remove_batch(guild_id, &words).await?;
                Ok(format!("Removed {} word(s) from the filter list.", removed))
            }
            Command::ViewFilter => {
                let words = self.store.list(guild_id).await?;
                Ok(if words.is_empty() {
                    "There are no words in the filter list.".to_string()
                } else {
                    format!("Current filter list: {}", words.join(", "))
                })
            }
            Command::Learn { .. } => unreachable!("learn is handled by run_learn"),
        }
    }
}

/// Parse batch file contents into normalized words.
///
/// Validation is all-or-nothing: any token that is empty or non-alphanumeric
/// after trimming rejects the whole batch before any store mutation.
fn parse_batch_tokens(contents: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    for raw in contents.split(',') {
        let token = raw.trim();
        if token.is_empty() || !token.chars().all(char::is_alphanumeric) {
            return Err(CommandError::ValidationFailed {
                message: BATCH_VALIDATION_FAILED.to_string(),
            });
        }
        words.push(token.to_lowercase());
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::time::Duration;

    use crate::moderation::ProfanityFilter;
    use crate::store::memory_store;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Initial { text: String, ephemeral: bool },
        Followup { text: String },
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl Recorder {
        fn responder(&self) -> Box<dyn Responder> {
            Box::new(RecordingResponder {
                recorder: self.clone(),
            })
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    struct RecordingResponder {
        recorder: Recorder,
    }

    #[async_trait]
    impl Responder for RecordingResponder {
        async fn send_initial(
            self: Box<Self>,
            reply: Reply,
        ) -> GatewayResult<Box<dyn Followup>> {
            self.recorder.events.lock().unwrap().push(Event::Initial {
                text: reply.text,
                ephemeral: reply.ephemeral,
            });
            Ok(Box::new(RecordingFollowup {
                recorder: self.recorder,
            }))
        }
    }

    struct RecordingFollowup {
        recorder: Recorder,
    }

    #[async_trait]
    impl Followup for RecordingFollowup {
        async fn send(self: Box<Self>, text: String) -> GatewayResult<()> {
            self.recorder
                .events
                .lock()
                .unwrap()
                .push(Event::Followup { text });
            Ok(())
        }
    }

    /// Dispatcher against an in-memory store and an unreachable backend.
    async fn make_dispatcher(default_words: Vec<&str>) -> (CommandDispatcher, FilterStore) {
        make_dispatcher_with_endpoint(default_words, "http://127.0.0.1:1/trigger").await
    }

    async fn make_dispatcher_with_endpoint(
        default_words: Vec<&str>,
        endpoint: &str,
    ) -> (CommandDispatcher, FilterStore) {
        let store = memory_store().await;
        let profanity =
            ProfanityFilter::from_words(default_words.into_iter().map(|w| w.to_string()));
        let pipeline = ModerationPipeline::new(Arc::new(profanity), store.clone());
        let gate = Arc::new(OutboundGate::new(
            endpoint.to_string(),
            Duration::from_millis(200),
        ));
        (
            CommandDispatcher::new(pipeline, store.clone(), gate),
            store,
        )
    }

    fn invocation(command: Command, is_admin: bool) -> Invocation {
        Invocation {
            guild_id: 42,
            channel_id: 123,
            user_mention: "<@7>".to_string(),
            invoker_is_admin: is_admin,
            command,
        }
    }

    #[tokio::test]
    async fn filter_command_without_admin_is_denied_before_store() {
        let (dispatcher, store) = make_dispatcher(vec![]).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(
                invocation(
                    Command::AddFilter {
                        word: "secret".to_string(),
                    },
                    false,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: PERMISSION_DENIED.to_string(),
                ephemeral: true,
            }]
        );
        assert!(store.list(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn learn_does_not_require_admin() {
        let (dispatcher, _) = make_dispatcher(vec!["bannedword"]).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(
                invocation(
                    Command::Learn {
                        course: "a bannedword course".to_string(),
                    },
                    false,
                ),
                recorder.responder(),
            )
            .await;

        // Reached moderation (and got blocked) rather than being denied.
        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            Event::Initial { text, ephemeral: false } if text.contains("bannedword")
        ));
    }

    #[tokio::test]
    async fn add_and_duplicate_add_replies() {
        let (dispatcher, _) = make_dispatcher(vec![]).await;

        for expected in [
            "'secret' has been added to the filter list.",
            "'secret' is already in the filter list.",
        ] {
            let recorder = Recorder::default();
            dispatcher
                .dispatch(
                    invocation(
                        Command::AddFilter {
                            word: "secret".to_string(),
                        },
                        true,
                    ),
                    recorder.responder(),
                )
                .await;
            assert_eq!(
                recorder.events(),
                vec![Event::Initial {
                    text: expected.to_string(),
                    ephemeral: true,
                }]
            );
        }
    }

    #[tokio::test]
    async fn remove_missing_word_reports_not_found() {
        let (dispatcher, _) = make_dispatcher(vec![]).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(
                invocation(
                    Command::RemoveFilter {
                        word: "ghost".to_string(),
                    },
                    true,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: "'ghost' is not in the filter list.".to_string(),
                ephemeral: true,
            }]
        );
    }

    #[tokio::test]
    async fn view_filter_lists_words_in_order() {
        let (dispatcher, store) = make_dispatcher(vec![]).await;
        store.add(42, "beta").await.unwrap();
        store.add(42, "alpha").await.unwrap();

        let recorder = Recorder::default();
        dispatcher
            .dispatch(invocation(Command::ViewFilter, true), recorder.responder())
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: "Current filter list: beta, alpha".to_string(),
                ephemeral: true,
            }]
        );
    }

    #[tokio::test]
    async fn view_empty_filter_list() {
        let (dispatcher, _) = make_dispatcher(vec![]).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(invocation(Command::ViewFilter, true), recorder.responder())
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: "There are no words in the filter list.".to_string(),
                ephemeral: true,
            }]
        );
    }

    #[tokio::test]
    async fn learn_blocked_by_custom_tier_names_the_word() {
        let (dispatcher, store) = make_dispatcher(vec![]).await;
        store.add(42, "secret").await.unwrap();

        let recorder = Recorder::default();
        dispatcher
            .dispatch(
                invocation(
                    Command::Learn {
                        course: "a secret topic".to_string(),
                    },
                    false,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: "The course description contains a prohibited word: 'secret'. \
                       Please try again."
                    .to_string(),
                ephemeral: false,
            }]
        );
    }

    #[tokio::test]
    async fn learn_allowed_acks_then_reports_backend_failure() {
        // Unreachable backend: the ack still goes out first, then one
        // generic follow-up.
        let (dispatcher, _) = make_dispatcher(vec![]).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(
                invocation(
                    Command::Learn {
                        course: "rust for beginners".to_string(),
                    },
                    false,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![
                Event::Initial {
                    text: "<@7> Generating course: rust for beginners...".to_string(),
                    ephemeral: false,
                },
                Event::Followup {
                    text: GENERIC_FAILURE.to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn learn_allowed_relays_backend_response_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // One-shot backend that answers with a body to relay.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/trigger", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\nConnection: close\r\n\r\nqueued: 1",
                )
                .await;
            let _ = socket.shutdown().await;
        });

        let (dispatcher, _) = make_dispatcher_with_endpoint(vec![], &endpoint).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(
                invocation(
                    Command::Learn {
                        course: "rust for beginners".to_string(),
                    },
                    false,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![
                Event::Initial {
                    text: "<@7> Generating course: rust for beginners...".to_string(),
                    ephemeral: false,
                },
                Event::Followup {
                    text: "queued: 1".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn batch_with_invalid_token_mutates_nothing() {
        let (dispatcher, store) = make_dispatcher(vec![]).await;
        let recorder = Recorder::default();

        dispatcher
            .dispatch(
                invocation(
                    Command::AddFilterBatch {
                        contents: "abc, not-valid!, def".to_string(),
                    },
                    true,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: BATCH_VALIDATION_FAILED.to_string(),
                ephemeral: true,
            }]
        );
        assert!(store.list(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_add_tolerates_duplicates_per_item() {
        let (dispatcher, store) = make_dispatcher(vec![]).await;
        store.add(42, "abc").await.unwrap();

        let recorder = Recorder::default();
        dispatcher
            .dispatch(
                invocation(
                    Command::AddFilterBatch {
                        contents: "abc, def, def".to_string(),
                    },
                    true,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: "Added 1 word(s) to the filter list.".to_string(),
                ephemeral: true,
            }]
        );
        assert_eq!(store.list(42).await.unwrap(), vec!["abc", "def"]);
    }

    #[tokio::test]
    async fn batch_remove_counts_present_words_only() {
        let (dispatcher, store) = make_dispatcher(vec![]).await;
        store.add(42, "abc").await.unwrap();
        store.add(42, "def").await.unwrap();

        let recorder = Recorder::default();
        dispatcher
            .dispatch(
                invocation(
                    Command::RemoveFilterBatch {
                        contents: "abc, ghost".to_string(),
                    },
                    true,
                ),
                recorder.responder(),
            )
            .await;

        assert_eq!(
            recorder.events(),
            vec![Event::Initial {
                text: "Removed 1 word(s) from the filter list.".to_string(),
                ephemeral: true,
            }]
        );
        assert_eq!(store.list(42).await.unwrap(), vec!["def"]);
    }

    #[test]
    fn batch_tokens_are_normalized() {
        let words = parse_batch_tokens(" Abc ,DEF,ghi ").unwrap();
        assert_eq!(words, vec!["abc", "def", "ghi"]);
    }

    #[test]
    fn batch_rejects_empty_input() {
        assert!(parse_batch_tokens("").is_err());
        assert!(parse_batch_tokens("abc,,def").is_err());
    }
}
