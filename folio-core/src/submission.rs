/// Contact form submission lifecycle.
///
/// A form moves `Idle -> Sending -> Success -> Idle` on delivery, or
/// `Idle -> Sending -> Idle` on any failure. Only one delivery may be in
/// flight per form. The confirmation clears itself: a successful delivery
/// hands out a [`ResetTicket`] which the host schedules, and expiring a
/// ticket that is no longer current does nothing.

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use thiserror::Error;

use crate::contact::{ContactError, ContactFields, ContactMessage, Field};
use crate::wire::CONTACT_PATH;

/// Generic text shown when delivery fails for any reason
pub const DELIVERY_FAILED_TEXT: &str = "Failed to send message";
pub const SENT_TEXT: &str = "Message sent!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Sending,
    Success,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Sending => "sending",
            SubmissionState::Success => "success",
        }
    }
}

/// Client-side form settings
#[derive(Debug, Clone, PartialEq)]
pub struct FormConfig {
    pub endpoint: String,
    /// How long the success confirmation stays up
    pub reset_delay: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            endpoint: CONTACT_PATH.to_string(),
            reset_delay: Duration::from_millis(3000),
        }
    }
}

/// Why a delivery attempt failed, as seen from the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("relay responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("relay rejected the message: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
}

impl DeliveryError {
    /// Text that is safe to show to the visitor
    pub fn user_message(&self) -> &str {
        match self {
            DeliveryError::Status {
                message: Some(message),
                ..
            } => message.as_str(),
            DeliveryError::Rejected(message) if !message.is_empty() => message.as_str(),
            _ => DELIVERY_FAILED_TEXT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("a submission is already in flight")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ContactError),
}

/// Feedback line shown next to the submit control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Sent,
    Invalid(ContactError),
    Failed(String),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::Sent => SENT_TEXT.to_string(),
            Notice::Invalid(ContactError::MissingFields(fields)) => {
                let names = fields.iter().map(Field::as_str).collect::<Vec<_>>().join(", ");
                format!("Please fill in: {}", names)
            }
            Notice::Invalid(err) => err.to_string(),
            Notice::Failed(message) => message.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Sent)
    }
}

/// Token for one scheduled `Success -> Idle` transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTicket {
    generation: u64,
    pub delay: Duration,
}

/// State of one contact form instance
#[derive(Debug)]
pub struct ContactForm {
    config: FormConfig,
    fields: ContactFields,
    state: SubmissionState,
    notice: Option<Notice>,
    generation: u64,
}

impl ContactForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            fields: ContactFields::default(),
            state: SubmissionState::Idle,
            notice: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the submit control (and the inputs) accept interaction
    pub fn can_submit(&self) -> bool {
        self.state != SubmissionState::Sending
    }

    /// Record typed input. Ignored while a submission is in flight.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.fields.set(field, value);
        true
    }

    /// Start a submission: `Idle | Success -> Sending`.
    ///
    /// Returns the message to deliver. Fields stay as typed until the
    /// delivery resolves.
    pub fn begin_submit(&mut self) -> Result<ContactMessage, SubmitRejected> {
        if self.state == SubmissionState::Sending {
            tracing::debug!("submit ignored, delivery already in flight");
            return Err(SubmitRejected::Busy);
        }

        let message = match self.fields.validate() {
            Ok(message) => message,
            Err(err) => {
                self.notice = Some(Notice::Invalid(err.clone()));
                return Err(err.into());
            }
        };

        // Invalidates any reset ticket still pending from an earlier success
        self.generation += 1;
        self.state = SubmissionState::Sending;
        self.notice = None;
        tracing::debug!(generation = self.generation, "contact form sending");
        Ok(message)
    }

    /// Finish the in-flight submission.
    ///
    /// On success the fields are cleared and a ticket for the automatic
    /// return to idle is handed out. On failure the form goes straight back
    /// to idle with the typed fields intact.
    pub fn resolve(&mut self, outcome: Result<(), DeliveryError>) -> Option<ResetTicket> {
        if self.state != SubmissionState::Sending {
            tracing::debug!(state = self.state.as_str(), "stale delivery result ignored");
            return None;
        }

        match outcome {
            Ok(()) => {
                self.state = SubmissionState::Success;
                self.fields.clear();
                self.notice = Some(Notice::Sent);
                Some(ResetTicket {
                    generation: self.generation,
                    delay: self.config.reset_delay,
                })
            }
            Err(err) => {
                tracing::debug!(error = %err, "contact delivery failed");
                self.state = SubmissionState::Idle;
                self.notice = Some(Notice::Failed(err.user_message().to_string()));
                None
            }
        }
    }

    /// `Success -> Idle` when `ticket` is still current
    pub fn expire(&mut self, ticket: ResetTicket) -> bool {
        if self.state != SubmissionState::Success || ticket.generation != self.generation {
            return false;
        }
        self.state = SubmissionState::Idle;
        self.notice = None;
        true
    }
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}

/// Delivers a validated message to the relay
pub trait ContactTransport {
    fn deliver(&self, message: &ContactMessage) -> impl Future<Output = Result<(), DeliveryError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Delivered; schedule the ticket to clear the confirmation
    Sent(ResetTicket),
    Failed(DeliveryError),
    /// The reply arrived after the form was dropped
    Abandoned,
}

/// A submission that has left `Idle` and awaits delivery.
///
/// Only a weak handle to the form is kept across the network await, so a
/// form torn down mid-flight is never updated.
#[derive(Debug)]
pub struct Submission {
    form: Weak<RefCell<ContactForm>>,
    message: ContactMessage,
}

impl Submission {
    /// Move `form` to `Sending` and capture the message to deliver
    pub fn begin(form: &Rc<RefCell<ContactForm>>) -> Result<Self, SubmitRejected> {
        let message = form.borrow_mut().begin_submit()?;
        Ok(Self {
            form: Rc::downgrade(form),
            message,
        })
    }

    pub fn message(&self) -> &ContactMessage {
        &self.message
    }

    /// Hand the message to `transport` and resolve the form with the result
    pub async fn deliver<T: ContactTransport>(self, transport: &T) -> SubmitOutcome {
        let result = transport.deliver(&self.message).await;

        let Some(form) = self.form.upgrade() else {
            tracing::debug!(delivered = result.is_ok(), "form dropped before delivery resolved");
            return SubmitOutcome::Abandoned;
        };
        let ticket = form.borrow_mut().resolve(result.clone());
        match (result, ticket) {
            (Ok(()), Some(ticket)) => SubmitOutcome::Sent(ticket),
            (Err(err), _) => SubmitOutcome::Failed(err),
            (Ok(()), None) => SubmitOutcome::Abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn filled_form() -> Rc<RefCell<ContactForm>> {
        let form = Rc::new(RefCell::new(ContactForm::default()));
        {
            let mut form = form.borrow_mut();
            form.set_field(Field::Name, "Ada");
            form.set_field(Field::Email, "ada@example.com");
            form.set_field(Field::Message, "Let's build something.");
        }
        form
    }

    fn run<T: ContactTransport>(
        form: &Rc<RefCell<ContactForm>>,
        transport: &T,
    ) -> Result<SubmitOutcome, SubmitRejected> {
        let submission = Submission::begin(form)?;
        Ok(block_on(submission.deliver(transport)))
    }

    /// Replies with a fixed result and counts requests
    struct FixedTransport {
        reply: Result<(), DeliveryError>,
        calls: Cell<usize>,
    }

    impl FixedTransport {
        fn new(reply: Result<(), DeliveryError>) -> Self {
            Self {
                reply,
                calls: Cell::new(0),
            }
        }
    }

    impl ContactTransport for FixedTransport {
        async fn deliver(&self, _message: &ContactMessage) -> Result<(), DeliveryError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    /// Holds each delivery open until the test releases it
    struct GatedTransport {
        gate: RefCell<Option<oneshot::Receiver<Result<(), DeliveryError>>>>,
        calls: Cell<usize>,
    }

    impl GatedTransport {
        fn new() -> (Rc<Self>, oneshot::Sender<Result<(), DeliveryError>>) {
            let (tx, rx) = oneshot::channel();
            let transport = Rc::new(Self {
                gate: RefCell::new(Some(rx)),
                calls: Cell::new(0),
            });
            (transport, tx)
        }
    }

    impl ContactTransport for GatedTransport {
        async fn deliver(&self, _message: &ContactMessage) -> Result<(), DeliveryError> {
            self.calls.set(self.calls.get() + 1);
            let gate = self.gate.borrow_mut().take();
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(DeliveryError::Network("gate dropped".into()))),
                None => Err(DeliveryError::Network("no gate".into())),
            }
        }
    }

    #[test]
    fn test_starts_idle() {
        let form = ContactForm::default();
        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(form.can_submit());
        assert_eq!(form.notice(), None);
        assert_eq!(form.config().reset_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_input_during_confirmation_survives_reset() {
        let form = filled_form();
        let transport = FixedTransport::new(Ok(()));
        let outcome = run(&form, &transport).expect("submission starts");
        let SubmitOutcome::Sent(ticket) = outcome else {
            panic!("expected delivery, got {outcome:?}");
        };

        assert!(form.borrow_mut().set_field(Field::Name, "Hi"));
        assert!(form.borrow_mut().expire(ticket));

        let form = form.borrow();
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.fields().name, "Hi");
        assert_eq!(form.notice(), None);
    }

    #[test]
    fn test_begin_moves_to_sending_without_touching_fields() {
        let form = filled_form();
        let submission = Submission::begin(&form).expect("valid fields");

        assert_eq!(form.borrow().state(), SubmissionState::Sending);
        assert!(!form.borrow().can_submit());
        assert_eq!(submission.message().name(), "Ada");
        assert_eq!(form.borrow().fields().name, "Ada");
    }

    #[test]
    fn test_success_clears_fields_then_resets() {
        let form = filled_form();
        let transport = FixedTransport::new(Ok(()));

        let outcome = run(&form, &transport).expect("submission starts");
        let SubmitOutcome::Sent(ticket) = outcome else {
            panic!("expected delivery, got {outcome:?}");
        };
        assert_eq!(ticket.delay, Duration::from_millis(3000));
        assert_eq!(transport.calls.get(), 1);

        {
            let form = form.borrow();
            assert_eq!(form.state(), SubmissionState::Success);
            assert!(form.fields().is_empty());
            assert_eq!(form.notice().map(Notice::text), Some("Message sent!".to_string()));
        }

        // Timer fires with no further user action
        assert!(form.borrow_mut().expire(ticket));
        assert_eq!(form.borrow().state(), SubmissionState::Idle);
        assert_eq!(form.borrow().notice(), None);
    }

    #[test]
    fn test_failure_keeps_fields_and_reenables_submit() {
        let form = filled_form();
        let typed = form.borrow().fields().clone();
        let transport = FixedTransport::new(Err(DeliveryError::Status {
            status: 500,
            message: Some("Failed to send message".into()),
        }));

        let outcome = run(&form, &transport).expect("submission starts");
        assert!(matches!(outcome, SubmitOutcome::Failed(DeliveryError::Status { status: 500, .. })));

        let form = form.borrow();
        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(form.can_submit());
        assert_eq!(form.fields(), &typed);
        let notice = form.notice().expect("failure is reported");
        assert!(notice.is_error());
        assert_eq!(notice.text(), "Failed to send message");
    }

    #[test]
    fn test_network_error_reports_generic_text() {
        let form = filled_form();
        let transport = FixedTransport::new(Err(DeliveryError::Network("connection refused".into())));

        run(&form, &transport).expect("submission starts");
        let form = form.borrow();
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.notice().map(Notice::text), Some(DELIVERY_FAILED_TEXT.to_string()));
        assert_eq!(form.fields().name, "Ada");
    }

    #[test]
    fn test_invalid_fields_never_reach_transport() {
        let form = Rc::new(RefCell::new(ContactForm::default()));
        form.borrow_mut().set_field(Field::Name, "Ada");
        let transport = FixedTransport::new(Ok(()));

        let rejected = run(&form, &transport).unwrap_err();
        assert_eq!(
            rejected,
            SubmitRejected::Invalid(ContactError::MissingFields(vec![Field::Email, Field::Message]))
        );
        assert_eq!(transport.calls.get(), 0);
        assert_eq!(form.borrow().state(), SubmissionState::Idle);
        assert_eq!(
            form.borrow().notice().map(Notice::text),
            Some("Please fill in: email, message".to_string())
        );
    }

    #[test]
    fn test_second_submit_while_sending_is_noop() {
        let form = filled_form();
        let (transport, release) = GatedTransport::new();

        let mut pool = LocalPool::new();
        let first = {
            let submission = Submission::begin(&form).expect("first submission starts");
            let transport = Rc::clone(&transport);
            pool.spawner()
                .spawn_local_with_handle(async move { submission.deliver(transport.as_ref()).await })
                .expect("spawn first submission")
        };
        pool.run_until_stalled();

        assert_eq!(form.borrow().state(), SubmissionState::Sending);
        assert!(!form.borrow().can_submit());
        assert!(!form.borrow_mut().set_field(Field::Name, "Grace"));

        let second = run(&form, transport.as_ref());
        assert_eq!(second, Err(SubmitRejected::Busy));
        assert_eq!(transport.calls.get(), 1);

        release.send(Ok(())).expect("first delivery still waiting");
        let first = pool.run_until(first);
        assert!(matches!(first, SubmitOutcome::Sent(_)));
        assert_eq!(form.borrow().state(), SubmissionState::Success);
    }

    #[test]
    fn test_reply_after_form_dropped_is_discarded() {
        let form = filled_form();
        let (transport, release) = GatedTransport::new();

        let mut pool = LocalPool::new();
        let pending = {
            let submission = Submission::begin(&form).expect("submission starts");
            let transport = Rc::clone(&transport);
            pool.spawner()
                .spawn_local_with_handle(async move { submission.deliver(transport.as_ref()).await })
                .expect("spawn submission")
        };
        pool.run_until_stalled();

        drop(form);
        release.send(Ok(())).expect("delivery still waiting");
        assert_eq!(pool.run_until(pending), SubmitOutcome::Abandoned);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let form = filled_form();
        let transport = FixedTransport::new(Ok(()));

        let Ok(SubmitOutcome::Sent(old_ticket)) = run(&form, &transport) else {
            panic!("first delivery should succeed");
        };

        // Resubmitting from the confirmation supersedes the pending reset
        {
            let mut form = form.borrow_mut();
            form.set_field(Field::Name, "Ada");
            form.set_field(Field::Email, "ada@example.com");
            form.set_field(Field::Message, "One more thing.");
        }
        let Ok(SubmitOutcome::Sent(new_ticket)) = run(&form, &transport) else {
            panic!("second delivery should succeed");
        };

        assert!(!form.borrow_mut().expire(old_ticket));
        assert_eq!(form.borrow().state(), SubmissionState::Success);
        assert!(form.borrow_mut().expire(new_ticket));
        assert!(!form.borrow_mut().expire(new_ticket));
    }

    #[test]
    fn test_resolve_outside_sending_is_ignored() {
        let mut form = ContactForm::default();
        assert_eq!(form.resolve(Ok(())), None);
        assert_eq!(form.state(), SubmissionState::Idle);
    }
}
