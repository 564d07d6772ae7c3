/// Contact form binding
///
/// Wires a `<form>` holding `name`, `email` and `message` controls to the
/// submission state machine, and delivers through the relay endpoint.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use folio_core::{
    ContactForm, ContactMessage, ContactTransport, DeliveryError, Field, FormConfig, RelayReply,
    SubmissionState, Submission, SubmitOutcome, SubmitRejected,
};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::net::http::Request;
use gloo::timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement,
};

/// JSON `POST` to the relay endpoint
#[derive(Debug, Clone)]
pub struct HttpContactTransport {
    endpoint: String,
}

impl HttpContactTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl ContactTransport for HttpContactTransport {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), DeliveryError> {
        let response = Request::post(&self.endpoint)
            .json(message)
            .map_err(|err| DeliveryError::Network(err.to_string()))?
            .send()
            .await
            .map_err(|err| DeliveryError::Network(err.to_string()))?;

        let status = response.status();
        let reply = response.json::<RelayReply>().await.ok();

        if !response.ok() {
            return Err(DeliveryError::Status {
                status,
                message: reply.and_then(|reply| reply.message),
            });
        }
        match reply {
            Some(RelayReply { ok: false, message }) => {
                Err(DeliveryError::Rejected(message.unwrap_or_default()))
            }
            _ => Ok(()),
        }
    }
}

/// Either kind of text control the form uses
enum TextControl {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl TextControl {
    fn find(form: &HtmlFormElement, field: Field) -> Result<Self, JsValue> {
        let selector = format!("[name=\"{}\"]", field.as_str());
        let element: Element = form
            .query_selector(&selector)?
            .ok_or_else(|| JsValue::from_str(&format!("contact form has no `{}` control", field)))?;

        match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => Ok(TextControl::Input(input)),
            Err(element) => element
                .dyn_into::<HtmlTextAreaElement>()
                .map(TextControl::TextArea)
                .map_err(|_| JsValue::from_str(&format!("`{}` is not a text control", field))),
        }
    }

    fn value(&self) -> String {
        match self {
            TextControl::Input(input) => input.value(),
            TextControl::TextArea(area) => area.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            TextControl::Input(input) => input.set_value(value),
            TextControl::TextArea(area) => area.set_value(value),
        }
    }

    fn set_disabled(&self, disabled: bool) {
        match self {
            TextControl::Input(input) => input.set_disabled(disabled),
            TextControl::TextArea(area) => area.set_disabled(disabled),
        }
    }
}

struct FormView {
    form: HtmlFormElement,
    controls: Vec<(Field, TextControl)>,
    submit: Option<HtmlButtonElement>,
    status: Option<HtmlElement>,
    idle_label: String,
}

impl FormView {
    fn bind(form: HtmlFormElement) -> Result<Self, JsValue> {
        let controls = Field::ALL
            .into_iter()
            .map(|field| TextControl::find(&form, field).map(|control| (field, control)))
            .collect::<Result<Vec<_>, _>>()?;

        let submit = form
            .query_selector("[type=\"submit\"]")?
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok());
        let status = form
            .query_selector("[data-contact-status]")?
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());
        let idle_label = submit
            .as_ref()
            .and_then(|button| button.text_content())
            .unwrap_or_else(|| "Send Message".to_string());

        Ok(Self {
            form,
            controls,
            submit,
            status,
            idle_label,
        })
    }

    fn render(&self, form: &ContactForm, write_fields: bool) {
        let sending = form.state() == SubmissionState::Sending;

        for (field, control) in &self.controls {
            control.set_disabled(sending);
            if write_fields {
                control.set_value(form.fields().get(*field));
            }
        }

        if let Some(button) = &self.submit {
            button.set_disabled(!form.can_submit());
            let label = if sending { "Sending..." } else { self.idle_label.as_str() };
            button.set_text_content(Some(label));
        }

        let mut result = self.form.set_attribute("data-state", form.state().as_str());
        if let Some(status) = &self.status {
            let text = form.notice().map(|notice| notice.text()).unwrap_or_default();
            status.set_text_content(Some(&text));
            let kind = match form.notice() {
                Some(notice) if notice.is_error() => "error",
                Some(_) => "success",
                None => "",
            };
            result = result.and_then(|_| status.set_attribute("data-contact-status", kind));
        }
        if let Err(err) = result {
            gloo::console::warn!("contact: failed to update form attributes", err);
        }
    }
}

/// Whether a render should push the model's fields into the controls.
///
/// The controls own typed text; the model only overwrites them when a
/// delivery succeeds and clears the form.
fn writes_fields(before: SubmissionState, after: SubmissionState) -> bool {
    before == SubmissionState::Sending && after == SubmissionState::Success
}

struct FormBinding {
    view: FormView,
    form: Rc<RefCell<ContactForm>>,
    transport: HttpContactTransport,
    reset: RefCell<Option<Timeout>>,
    rendered: Cell<SubmissionState>,
}

impl FormBinding {
    fn render(&self) {
        let form = self.form.borrow();
        let state = form.state();
        let write_fields = writes_fields(self.rendered.replace(state), state);
        self.view.render(&form, write_fields);
    }

    fn sync_fields(&self) {
        let mut form = self.form.borrow_mut();
        for (field, control) in &self.view.controls {
            form.set_field(*field, control.value());
        }
    }

    fn on_submit(self: &Rc<Self>, event: &Event) {
        event.prevent_default();
        self.sync_fields();

        let submission = match Submission::begin(&self.form) {
            Ok(submission) => submission,
            Err(SubmitRejected::Busy) => return,
            Err(SubmitRejected::Invalid(_)) => {
                self.render();
                return;
            }
        };
        // A new submission supersedes a pending confirmation reset
        self.reset.borrow_mut().take();
        self.render();

        let binding = Rc::downgrade(self);
        let transport = self.transport.clone();
        spawn_local(async move {
            let outcome = submission.deliver(&transport).await;
            match binding.upgrade() {
                Some(binding) => binding.on_outcome(outcome),
                None => gloo::console::debug!("contact form dropped before delivery resolved"),
            }
        });
    }

    fn on_outcome(self: &Rc<Self>, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Sent(ticket) => {
                let binding: Weak<Self> = Rc::downgrade(self);
                let millis = u32::try_from(ticket.delay.as_millis()).unwrap_or(u32::MAX);
                let timeout = Timeout::new(millis, move || {
                    if let Some(binding) = binding.upgrade() {
                        binding.reset.borrow_mut().take();
                        if binding.form.borrow_mut().expire(ticket) {
                            binding.render();
                        }
                    }
                });
                *self.reset.borrow_mut() = Some(timeout);
            }
            SubmitOutcome::Failed(err) => {
                gloo::console::error!("Failed to send message", err.to_string());
            }
            SubmitOutcome::Abandoned => {}
        }
        self.render();
    }
}

/// Contact form driven by the submission state machine.
///
/// The form must contain controls named `name`, `email` and `message`;
/// a submit button and an element marked `data-contact-status` are used
/// when present. Freeing this detaches the listeners and cancels a pending
/// confirmation reset.
#[wasm_bindgen]
pub struct ContactFormBinding {
    binding: Rc<FormBinding>,
    _listeners: [EventListener; 2],
}

#[wasm_bindgen]
impl ContactFormBinding {
    /// Bind to `form`, posting to `endpoint` (defaults to `/api/contact`)
    #[wasm_bindgen(constructor)]
    pub fn new(form: HtmlFormElement, endpoint: Option<String>) -> Result<ContactFormBinding, JsValue> {
        let mut config = FormConfig::default();
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        let transport = HttpContactTransport::new(config.endpoint.clone());

        let binding = Rc::new(FormBinding {
            view: FormView::bind(form)?,
            form: Rc::new(RefCell::new(ContactForm::new(config))),
            transport,
            reset: RefCell::new(None),
            rendered: Cell::new(SubmissionState::Idle),
        });
        binding.sync_fields();
        binding.render();

        let on_input = {
            let handler = Rc::clone(&binding);
            EventListener::new(&binding.view.form, "input", move |_: &Event| {
                handler.sync_fields();
            })
        };
        let on_submit = {
            let handler = Rc::clone(&binding);
            EventListener::new_with_options(
                &binding.view.form,
                "submit",
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| handler.on_submit(event),
            )
        };

        Ok(ContactFormBinding {
            binding,
            _listeners: [on_input, on_submit],
        })
    }

    /// Current state: `idle`, `sending` or `success`
    pub fn state(&self) -> String {
        self.binding.form.borrow().state().as_str().to_string()
    }
}

impl Drop for ContactFormBinding {
    fn drop(&mut self) {
        self.binding.reset.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::SubmissionState::{Idle, Sending, Success};

    #[test]
    fn test_only_the_success_clear_writes_controls() {
        assert!(writes_fields(Sending, Success));

        // Text typed while the confirmation shows survives its expiry
        assert!(!writes_fields(Success, Idle));
        assert!(!writes_fields(Success, Success));
        assert!(!writes_fields(Sending, Idle));
        assert!(!writes_fields(Idle, Sending));
        assert!(!writes_fields(Idle, Idle));
    }
}
