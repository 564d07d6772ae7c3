/// DOM binding for the tilt effect
use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{ElementBounds, MoveOutcome, TiltConfig, TiltEngine, TiltStyle, TransformSyntax};
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, MouseEvent};

struct TiltView {
    element: HtmlElement,
    engine: RefCell<TiltEngine>,
    frame: RefCell<Option<AnimationFrame>>,
}

impl TiltView {
    fn bounds(&self) -> ElementBounds {
        let rect = self.element.get_bounding_client_rect();
        ElementBounds::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn pointer_move(self: &Rc<Self>, event: &MouseEvent) {
        let bounds = self.bounds();
        let outcome = self.engine.borrow_mut().pointer_move(
            event.client_x() as f32,
            event.client_y() as f32,
            bounds,
        );
        if outcome != MoveOutcome::RequestFrame {
            return;
        }

        let view = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            if let Some(view) = view.upgrade() {
                view.frame.borrow_mut().take();
                let style = view.engine.borrow_mut().on_frame();
                if let Some(style) = style {
                    view.apply(&style);
                }
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn pointer_leave(&self) {
        // Dropping the handle cancels the pending frame
        self.frame.borrow_mut().take();
        let style = self.engine.borrow_mut().pointer_leave();
        if let Some(style) = style {
            self.apply(&style);
        }
    }

    fn detach(&self) {
        self.frame.borrow_mut().take();
        self.engine.borrow_mut().detach();
    }

    fn apply(&self, style: &TiltStyle) {
        let css = self.element.style();
        let result = css
            .set_property("transform", &style.transform)
            .and_then(|_| css.set_property("transition", &style.transition));
        if let Err(err) = result {
            gloo::console::warn!("tilt: failed to apply style", err);
        }
    }
}

/// Tilt effect attached to one element.
///
/// Listeners and any pending frame are released when this is freed or
/// [`TiltBinding::detach`] is called.
#[wasm_bindgen]
pub struct TiltBinding {
    view: Rc<TiltView>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl TiltBinding {
    /// Attach with the default tuning
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement) -> TiltBinding {
        Self::with_config(element, TiltConfig::default())
    }

    /// Attach with a custom sensitivity (degrees) and hover scale
    pub fn with_tuning(element: HtmlElement, sensitivity: f32, hover_scale: f32) -> TiltBinding {
        let config = TiltConfig {
            sensitivity,
            hover_scale,
            ..TiltConfig::default()
        };
        Self::with_config(element, config)
    }

    /// Attach with the default tuning, writing a single `matrix3d`
    pub fn with_matrix(element: HtmlElement) -> TiltBinding {
        let config = TiltConfig {
            syntax: TransformSyntax::Matrix,
            ..TiltConfig::default()
        };
        Self::with_config(element, config)
    }

    pub fn detach(&mut self) {
        self.listeners.clear();
        self.view.detach();
    }
}

impl TiltBinding {
    pub fn with_config(element: HtmlElement, config: TiltConfig) -> TiltBinding {
        let view = Rc::new(TiltView {
            element,
            engine: RefCell::new(TiltEngine::new(config)),
            frame: RefCell::new(None),
        });

        let on_move = {
            let handler = Rc::clone(&view);
            EventListener::new(&view.element, "mousemove", move |event: &Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    handler.pointer_move(event);
                }
            })
        };
        let on_leave = {
            let handler = Rc::clone(&view);
            EventListener::new(&view.element, "mouseleave", move |_: &Event| {
                handler.pointer_leave();
            })
        };

        TiltBinding {
            view,
            listeners: vec![on_move, on_leave],
        }
    }
}

impl Drop for TiltBinding {
    fn drop(&mut self) {
        self.detach();
    }
}
