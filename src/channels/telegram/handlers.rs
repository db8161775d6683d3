use super::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update};
use super::ChatTransport;
use crate::classifier::{ClassificationOutcome, Classifier};
use crate::config::Settings;
use crate::payload::{
    build_payload, build_status_update, format_timestamp, parse_status_callback,
    status_callback_data, MessageEnvelope, OutgoingPayload, StatusCode, StatusError, UserInfo,
};
use crate::shared::{truncate_chars, RelayLog, TraceId};
use crate::webhook::{
    Sleeper, ThreadSleeper, UreqTransport, WebhookDelivery, WebhookError, WebhookTransport,
};
use chrono::Utc;

pub const APOLOGY_TEXT: &str = "Временно не удалось обработать сообщение. Попробуйте позже.";
pub const GREETING_TEXT: &str =
    "Здравствуйте! Опишите задачу одним сообщением, и я передам её команде.";
const NOT_ALLOWED_TEXT: &str = "Недостаточно прав";
const UNKNOWN_STATUS_TEXT: &str = "Неизвестный статус";
const LOG_PREVIEW_CHARS: usize = 50;
const CARD_TEXT_CHARS: usize = 500;
const BUTTONS_PER_ROW: usize = 2;

/// Where the relay sends things: the primary and status webhooks plus the
/// admin chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTargets {
    pub webhook_url: String,
    pub status_webhook_url: Option<String>,
    pub admin_chat_id: Option<i64>,
}

impl RelayTargets {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            webhook_url: settings.webhook_url.clone(),
            status_webhook_url: settings.status_webhook_url.clone(),
            admin_chat_id: settings.admin_chat_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Ignored,
    Command,
    Delivered {
        trace_id: TraceId,
        fallback: bool,
    },
    DeliveryFailed {
        trace_id: TraceId,
        reason: String,
    },
    Unauthorized,
    StatusRejected(StatusError),
    StatusUpdated {
        trace_id: TraceId,
        code: StatusCode,
    },
    StatusFailed {
        trace_id: TraceId,
        code: StatusCode,
        reason: String,
    },
}

/// Handles one chat update as an independent unit of work. Holds only
/// read-only configuration and clients, so one instance serves every chat.
#[derive(Debug)]
pub struct Relay<T = UreqTransport, S = ThreadSleeper> {
    classifier: Classifier,
    delivery: WebhookDelivery<T, S>,
    targets: RelayTargets,
    log: RelayLog,
}

impl Relay {
    pub fn from_settings(settings: &Settings, log: RelayLog) -> Self {
        Self::new(
            Classifier::from_settings(settings),
            WebhookDelivery::from_settings(settings),
            RelayTargets::from_settings(settings),
            log,
        )
    }
}

impl<T: WebhookTransport, S: Sleeper> Relay<T, S> {
    pub fn new(
        classifier: Classifier,
        delivery: WebhookDelivery<T, S>,
        targets: RelayTargets,
        log: RelayLog,
    ) -> Self {
        Self {
            classifier,
            delivery,
            targets,
            log,
        }
    }

    pub fn log(&self) -> &RelayLog {
        &self.log
    }

    pub fn handle_update<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        update: &Update,
    ) -> UpdateOutcome {
        if let Some(query) = &update.callback_query {
            return self.handle_callback(chat, query);
        }
        match &update.message {
            Some(message) => self.handle_message(chat, message),
            None => UpdateOutcome::Ignored,
        }
    }

    fn handle_message<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        message: &Message,
    ) -> UpdateOutcome {
        let Some(text) = message.text.as_deref().map(str::trim) else {
            return UpdateOutcome::Ignored;
        };
        if text.is_empty() {
            return UpdateOutcome::Ignored;
        }
        if text.starts_with('/') {
            return self.handle_command(chat, message, text);
        }
        self.relay_text(chat, message, text)
    }

    fn handle_command<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        message: &Message,
        text: &str,
    ) -> UpdateOutcome {
        let trace_id = TraceId::from_message(message.chat.id, message.message_id);
        let command = text
            .split_whitespace()
            .next()
            .and_then(|token| token.split('@').next())
            .unwrap_or_default();
        match command {
            "/start" => {
                self.send(chat, &trace_id, message.chat.id, GREETING_TEXT, None);
                UpdateOutcome::Command
            }
            "/chatid" => {
                let reply = format!("chat_id: {}", message.chat.id);
                self.send(chat, &trace_id, message.chat.id, &reply, None);
                UpdateOutcome::Command
            }
            _ => UpdateOutcome::Ignored,
        }
    }

    fn relay_text<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        message: &Message,
        text: &str,
    ) -> UpdateOutcome {
        let trace_id = TraceId::from_message(message.chat.id, message.message_id);
        let trace = trace_id.as_str();
        self.log.info(
            trace,
            "message.received",
            &format!("received message: {}", truncate_chars(text, LOG_PREVIEW_CHARS)),
        );

        let outcome = self.classifier.classify(text);
        if let Some(reason) = outcome.fallback_reason() {
            self.log
                .warn(trace, "classify.fallback", &reason.to_string());
        }
        let fallback = matches!(outcome, ClassificationOutcome::Fallback { .. });
        let classification = outcome.into_result();
        self.log.info(
            trace,
            "classify.done",
            &format!(
                "classified: {}/{}",
                classification.intent, classification.service
            ),
        );

        let envelope = MessageEnvelope {
            trace_id: trace_id.clone(),
            created_at: format_timestamp(Utc::now()),
            chat_id: message.chat.id,
            message_id: message.message_id,
            user: message
                .from
                .as_ref()
                .map(|user| UserInfo {
                    id: Some(user.id),
                    username: user.username.clone(),
                    name: Some(user.full_name()),
                })
                .unwrap_or_default(),
            text: text.to_string(),
        };
        let payload = build_payload(&envelope, &classification);

        if let Err(err) = self.delivery.deliver(&self.targets.webhook_url, &payload) {
            let reason = err.to_string();
            let event = if err.is_terminal() {
                "webhook.rejected"
            } else {
                "webhook.failed"
            };
            self.log
                .error(trace, event, &format!("make webhook failed: {reason}"));
            self.notify_admin(
                chat,
                &trace_id,
                &format!("Не удалось отправить обращение {trace} в Make: {reason}"),
                None,
            );
            self.send(chat, &trace_id, message.chat.id, APOLOGY_TEXT, None);
            return UpdateOutcome::DeliveryFailed { trace_id, reason };
        }
        self.log
            .info(trace, "webhook.delivered", "sent to make successfully");

        self.send(
            chat,
            &trace_id,
            message.chat.id,
            &confirmation_text(&payload),
            None,
        );
        self.notify_admin(
            chat,
            &trace_id,
            &admin_card(&payload),
            Some(&status_keyboard(&trace_id)),
        );
        UpdateOutcome::Delivered { trace_id, fallback }
    }

    fn handle_callback<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        query: &CallbackQuery,
    ) -> UpdateOutcome {
        let origin_chat = query.message.as_ref().map(|message| message.chat.id);
        let authorized = self
            .targets
            .admin_chat_id
            .is_some_and(|admin| origin_chat == Some(admin) || query.from.id == admin);
        if !authorized {
            self.log.warn(
                "",
                "status.unauthorized",
                &format!("status callback from user {} rejected", query.from.id),
            );
            self.answer(chat, "", &query.id, Some(NOT_ALLOWED_TEXT));
            return UpdateOutcome::Unauthorized;
        }

        let data = query.data.as_deref().unwrap_or_default();
        let (code, trace_id) = match parse_status_callback(data) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.log.warn("", "status.rejected", &err.to_string());
                self.answer(chat, "", &query.id, Some(UNKNOWN_STATUS_TEXT));
                return UpdateOutcome::StatusRejected(err);
            }
        };

        let trace = trace_id.as_str();
        let payload = build_status_update(&trace_id, code, &format_timestamp(Utc::now()));
        match self
            .delivery
            .deliver_status(self.targets.status_webhook_url.as_deref(), &payload)
        {
            Ok(_) => {
                self.log.info(
                    trace,
                    "status.delivered",
                    &format!("status changed to {code}"),
                );
                self.answer(chat, trace, &query.id, Some(code.label()));
                self.notify_admin(
                    chat,
                    &trace_id,
                    &format!("Статус {trace}: {}", code.label()),
                    None,
                );
                UpdateOutcome::StatusUpdated { trace_id, code }
            }
            Err(err) => {
                let reason = err.to_string();
                let event = match err {
                    WebhookError::NotConfigured { .. } => "status.not_configured",
                    _ => "status.failed",
                };
                self.log.error(trace, event, &reason);
                self.answer(chat, trace, &query.id, Some("Не удалось обновить статус"));
                self.notify_admin(
                    chat,
                    &trace_id,
                    &format!("Не удалось обновить статус {trace}: {reason}"),
                    None,
                );
                UpdateOutcome::StatusFailed {
                    trace_id,
                    code,
                    reason,
                }
            }
        }
    }

    fn notify_admin<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        trace_id: &TraceId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) {
        match self.targets.admin_chat_id {
            Some(admin) => self.send(chat, trace_id, admin, text, keyboard),
            None => self.log.warn(
                trace_id.as_str(),
                "admin.skipped",
                "admin chat is not configured",
            ),
        }
    }

    fn send<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        trace_id: &TraceId,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) {
        if let Err(err) = chat.send_message(chat_id, text, keyboard) {
            self.log
                .error(trace_id.as_str(), "chat.send_failed", &err.to_string());
        }
    }

    fn answer<C: ChatTransport + ?Sized>(
        &self,
        chat: &C,
        trace: &str,
        callback_id: &str,
        text: Option<&str>,
    ) {
        if let Err(err) = chat.answer_callback(callback_id, text) {
            self.log.error(trace, "chat.answer_failed", &err.to_string());
        }
    }
}

pub fn confirmation_text(payload: &OutgoingPayload) -> String {
    format!(
        "Принято\nТип: {}\nУслуга: {}\nКратко: {}",
        payload.intent, payload.service, payload.summary
    )
}

pub fn admin_card(payload: &OutgoingPayload) -> String {
    let author = match (&payload.user.name, &payload.user.username) {
        (Some(name), Some(username)) => format!("{name} (@{username})"),
        (Some(name), None) => name.clone(),
        (None, Some(username)) => format!("@{username}"),
        (None, None) => "неизвестно".to_string(),
    };
    let or_dash = |value: Option<&str>| {
        value
            .filter(|v| !v.is_empty())
            .unwrap_or("-")
            .to_string()
    };

    [
        format!("Новое обращение {}", payload.trace_id),
        format!("От: {author}"),
        format!(
            "Тип: {} / Услуга: {} ({:.2})",
            payload.intent, payload.service, payload.confidence
        ),
        format!("Кратко: {}", payload.summary),
        format!("Цель: {}", or_dash(Some(payload.goal.as_str()))),
        format!(
            "Бюджет: {}",
            payload
                .budget
                .map(|budget| budget.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!("Срок: {}", or_dash(payload.deadline_text.as_deref())),
        format!("Контакт: {}", or_dash(payload.contact.as_deref())),
        format!("Текст: {}", truncate_chars(&payload.text, CARD_TEXT_CHARS)),
    ]
    .join("\n")
}

pub fn status_keyboard(trace_id: &TraceId) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = StatusCode::ALL
        .into_iter()
        .map(|code| {
            InlineKeyboardButton::callback(code.label(), status_callback_data(code, trace_id))
        })
        .collect();
    InlineKeyboardMarkup {
        inline_keyboard: buttons
            .chunks(BUTTONS_PER_ROW)
            .map(<[InlineKeyboardButton]>::to_vec)
            .collect(),
    }
}
