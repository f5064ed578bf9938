//! Send message use case.
//!
//! Handles one inbound user message end to end:
//!
//! 1. Record the user turn in the [`Session`]
//! 2. Assemble the request (system prompt, history, document-wrapped latest turn)
//! 3. Log the full outbound message list
//! 4. Call the completion gateway in streaming or blocking mode
//! 5. Record the assistant turn (the reply, or the apology on failure)
//!
//! Completion failures never abort the session: they are logged, reported to
//! the [`ReplyObserver`], and replaced with [`ChatParams::apology`]. Only a
//! gateway that is not configured at all (no API key) aborts the turn, and it
//! does so before anything is recorded.

use crate::config::{ChatParams, CompletionMode};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::reply_observer::ReplyObserver;
use docchat_domain::util::preview;
use docchat_domain::{
    DomainError, ReplyEnvelope, Session, build_request, contains_wrapper_tags,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that abort a chat turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Transcript index of the recorded user turn.
    pub user_index: usize,
    /// Transcript index of the recorded assistant turn.
    pub assistant_index: usize,
    /// Text recorded as the assistant turn.
    pub reply: String,
    /// Whether the reply was delivered through the observer as deltas.
    pub streamed: bool,
    /// Whether a blocking reply was unwrapped from a `{"response": ...}` envelope.
    pub structured: bool,
    /// The completion failure that was replaced by the apology, if any.
    pub failure: Option<GatewayError>,
}

impl TurnOutcome {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Use case for handling one user message.
pub struct SendMessageUseCase {
    gateway: Arc<dyn CompletionGateway>,
    params: ChatParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SendMessageUseCase {
    pub fn new(gateway: Arc<dyn CompletionGateway>, params: ChatParams) -> Self {
        Self {
            gateway,
            params,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &ChatParams {
        &self.params
    }

    /// Switch between streaming and blocking for subsequent turns.
    pub fn set_mode(&mut self, mode: CompletionMode) {
        self.params.mode = mode;
    }

    /// Handle one user message against `session`.
    pub async fn execute(
        &self,
        session: &mut Session,
        document: &str,
        message: &str,
        observer: &dyn ReplyObserver,
    ) -> Result<TurnOutcome, SendMessageError> {
        if message.is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        self.gateway.ensure_ready()?;

        let user_index = session.add_user_message(message);
        if contains_wrapper_tags(message) || contains_wrapper_tags(document) {
            warn!("Message or document contains wrapper tags; the wrapped turn may be ambiguous");
        }

        let request = CompletionRequest::new(
            session.model().clone(),
            build_request(session.system_prompt(), session.messages(), document),
        );
        self.log_api_request(&request);

        let streaming = self.params.mode.is_streaming();
        observer.on_request_start(&request.model, streaming);
        let result = match self.params.mode {
            CompletionMode::Streaming => self
                .complete_streaming(&request, observer)
                .await
                .map(|text| (text, false)),
            CompletionMode::Blocking => self.gateway.complete(&request).await.map(|raw| {
                let envelope = ReplyEnvelope::parse(&raw);
                let structured = envelope.is_structured();
                (envelope.into_text(), structured)
            }),
        };
        observer.on_request_end();

        let (reply, structured, failure) = match result {
            Ok((text, structured)) => (text, structured, None),
            Err(e) => {
                error!("Error communicating with completion endpoint: {}", e);
                observer.on_failure(&e.to_string());
                (self.params.apology.clone(), false, Some(e))
            }
        };

        let assistant_index = session.add_assistant_message(reply.clone());
        info!(
            "Assistant reply #{} ({} chars): {}",
            assistant_index,
            reply.chars().count(),
            preview(&reply, 80)
        );
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::AssistantReply,
            serde_json::json!({
                "index": assistant_index,
                "model": request.model.as_str(),
                "mode": self.params.mode.as_str(),
                "structured": structured,
                "failed": failure.is_some(),
                "text": reply,
            }),
        ));

        Ok(TurnOutcome {
            user_index,
            assistant_index,
            reply,
            streamed: streaming && failure.is_none(),
            structured,
            failure,
        })
    }

    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
        observer: &dyn ReplyObserver,
    ) -> Result<String, GatewayError> {
        let handle = self.gateway.complete_streaming(request).await?;
        let mut chunks = 0usize;
        let text = handle
            .accumulate(|chunk| {
                chunks += 1;
                observer.on_delta(chunk);
            })
            .await?;
        debug!("Stream finished after {} chunks", chunks);
        Ok(text)
    }

    fn log_api_request(&self, request: &CompletionRequest) {
        info!("API Request Chat History:");
        for message in &request.messages {
            info!("{}:\n{}", message.role.as_str().to_uppercase(), message.content);
        }
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::ApiRequest,
            serde_json::json!({
                "model": request.model.as_str(),
                "mode": self.params.mode.as_str(),
                "messages": request.messages,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::StreamHandle;
    use crate::ports::reply_observer::NoReplyObserver;
    use async_trait::async_trait;
    use docchat_domain::{Message, Model, Role, StreamEvent, format_user_message_with_doc};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Gateway returning scripted replies and recording every request
    struct ScriptedGateway {
        replies: Mutex<Vec<Result<String, GatewayError>>>,
        stream: Mutex<Option<Vec<StreamEvent>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        ready: Result<(), GatewayError>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<&str, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .rev()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                stream: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
                ready: Ok(()),
            }
        }

        fn streaming(events: Vec<StreamEvent>) -> Self {
            let gateway = Self::new(vec![]);
            *gateway.stream.lock().unwrap() = Some(events);
            gateway
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        fn ensure_ready(&self) -> Result<(), GatewayError> {
            self.ready.clone()
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(GatewayError::RequestFailed("no reply scripted".into())))
        }

        async fn complete_streaming(
            &self,
            request: &CompletionRequest,
        ) -> Result<StreamHandle, GatewayError> {
            let events = self.stream.lock().unwrap().take();
            let Some(events) = events else {
                let text = self.complete(request).await?;
                let (tx, rx) = mpsc::channel(1);
                tx.send(StreamEvent::Completed(text)).await.unwrap();
                return Ok(StreamHandle::new(rx));
            };
            self.requests.lock().unwrap().push(request.clone());
            let (tx, rx) = mpsc::channel(events.len().max(1));
            for event in events {
                tx.send(event).await.unwrap();
            }
            Ok(StreamHandle::new(rx))
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        deltas: Mutex<Vec<String>>,
        failures: Mutex<Vec<String>>,
        started: Mutex<Vec<bool>>,
    }

    impl ReplyObserver for RecordingObserver {
        fn on_request_start(&self, _model: &Model, streaming: bool) {
            self.started.lock().unwrap().push(streaming);
        }
        fn on_delta(&self, chunk: &str) {
            self.deltas.lock().unwrap().push(chunk.to_string());
        }
        fn on_failure(&self, error: &str) {
            self.failures.lock().unwrap().push(error.to_string());
        }
    }

    fn blocking() -> ChatParams {
        ChatParams::default().with_mode(CompletionMode::Blocking)
    }

    #[tokio::test]
    async fn blocking_reply_with_envelope_is_unwrapped() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(r#"{"response": "ok"}"#)]));
        let use_case = SendMessageUseCase::new(gateway.clone(), blocking());
        let mut session = Session::new("sys", Model::default());

        let outcome = use_case
            .execute(&mut session, "doc", "hi", &NoReplyObserver)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "ok");
        assert!(outcome.structured);
        assert!(!outcome.streamed);
        assert_eq!(session.messages()[1], Message::assistant("ok"));
    }

    #[tokio::test]
    async fn blocking_plain_reply_is_kept_verbatim() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok("plain text")]));
        let use_case = SendMessageUseCase::new(gateway, blocking());
        let mut session = Session::new("sys", Model::default());

        let outcome = use_case
            .execute(&mut session, "doc", "hi", &NoReplyObserver)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "plain text");
        assert!(!outcome.structured);
        assert_eq!(session.messages()[1].content, "plain text");
    }

    #[tokio::test]
    async fn request_wraps_only_latest_user_turn() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok("one"), Ok("two")]));
        let use_case = SendMessageUseCase::new(gateway.clone(), blocking());
        let mut session = Session::new("be brief", Model::Gpt4o);

        use_case
            .execute(&mut session, "DOC", "first", &NoReplyObserver)
            .await
            .unwrap();
        use_case
            .execute(&mut session, "DOC", "second", &NoReplyObserver)
            .await
            .unwrap();

        let requests = gateway.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert_eq!(second.model, Model::Gpt4o);
        assert_eq!(
            second.messages,
            vec![
                Message::system("be brief"),
                Message::user("first"),
                Message::assistant("one"),
                Message::user(format_user_message_with_doc("DOC", "second")),
            ]
        );
        // The transcript keeps the raw user text
        assert_eq!(session.messages()[2], Message::user("second"));
        assert_eq!(session.len(), 4);
    }

    #[tokio::test]
    async fn streaming_deltas_reach_observer() {
        let gateway = Arc::new(ScriptedGateway::streaming(vec![
            StreamEvent::Delta("Hel".to_string()),
            StreamEvent::Delta("lo!".to_string()),
            StreamEvent::Completed("Hello!".to_string()),
        ]));
        let use_case = SendMessageUseCase::new(gateway, ChatParams::default());
        let observer = RecordingObserver::default();
        let mut session = Session::new("sys", Model::default());

        let outcome = use_case
            .execute(&mut session, "doc", "greet me", &observer)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "Hello!");
        assert!(outcome.streamed);
        assert_eq!(*observer.deltas.lock().unwrap(), vec!["Hel", "lo!"]);
        assert_eq!(*observer.started.lock().unwrap(), vec![true]);
        assert_eq!(session.messages()[1].content, "Hello!");
    }

    #[tokio::test]
    async fn streaming_failure_records_apology() {
        let gateway = Arc::new(ScriptedGateway::streaming(vec![
            StreamEvent::Delta("par".to_string()),
            StreamEvent::Error("connection reset".to_string()),
        ]));
        let use_case = SendMessageUseCase::new(gateway, ChatParams::default());
        let observer = RecordingObserver::default();
        let mut session = Session::new("sys", Model::default());

        let outcome = use_case
            .execute(&mut session, "doc", "hi", &observer)
            .await
            .unwrap();

        assert!(outcome.is_failure());
        assert!(!outcome.streamed);
        assert_eq!(outcome.reply, "Sorry, I couldn't process that.");
        assert_eq!(session.messages()[1].content, outcome.reply);
        assert_eq!(observer.failures.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blocking_failure_keeps_session_going() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::ApiError {
                status: 500,
                message: "boom".to_string(),
            }),
            Ok("recovered"),
        ]));
        let use_case =
            SendMessageUseCase::new(gateway, blocking().with_apology("Try again later."));
        let mut session = Session::new("sys", Model::default());

        let first = use_case
            .execute(&mut session, "doc", "one", &NoReplyObserver)
            .await
            .unwrap();
        let second = use_case
            .execute(&mut session, "doc", "two", &NoReplyObserver)
            .await
            .unwrap();

        assert_eq!(first.reply, "Try again later.");
        assert_eq!(second.reply, "recovered");
        assert_eq!(session.len(), 4);
        assert_eq!(second.assistant_index, 3);
    }

    #[tokio::test]
    async fn missing_api_key_aborts_before_recording() {
        let mut gateway = ScriptedGateway::new(vec![Ok("unused")]);
        gateway.ready = Err(GatewayError::MissingApiKey("OPENAI_API_KEY".to_string()));
        let gateway = Arc::new(gateway);
        let use_case = SendMessageUseCase::new(gateway.clone(), blocking());
        let mut session = Session::new("sys", Model::default());

        let err = use_case
            .execute(&mut session, "doc", "hi", &NoReplyObserver)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SendMessageError::Gateway(GatewayError::MissingApiKey(_))
        ));
        assert!(session.is_empty());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let use_case = SendMessageUseCase::new(gateway, blocking());
        let mut session = Session::new("sys", Model::default());

        let err = use_case
            .execute(&mut session, "doc", "", &NoReplyObserver)
            .await
            .unwrap_err();
        assert_eq!(err, SendMessageError::Domain(DomainError::EmptyMessage));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn whitespace_message_is_sent_as_is() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok("noted")]));
        let use_case = SendMessageUseCase::new(gateway.clone(), blocking());
        let mut session = Session::new("sys", Model::default());

        let outcome = use_case
            .execute(&mut session, "doc", "   ", &NoReplyObserver)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "noted");
        assert_eq!(session.message(0).unwrap().content, "   ");
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn turns_alternate_user_assistant() {
        let replies: Vec<Result<&str, GatewayError>> = vec![Ok("a"), Ok("b"), Ok("c")];
        let gateway = Arc::new(ScriptedGateway::new(replies));
        let use_case = SendMessageUseCase::new(gateway, blocking());
        let mut session = Session::new("sys", Model::default());

        for q in ["x", "y", "z"] {
            use_case
                .execute(&mut session, "", q, &NoReplyObserver)
                .await
                .unwrap();
        }

        assert_eq!(session.len(), 6);
        let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }
}
