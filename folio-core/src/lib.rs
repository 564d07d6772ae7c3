/// Folio Core Library - Shared logic for the portfolio site
///
/// This library holds the stateful-but-host-independent pieces: the tilt
/// effect and its frame coalescing, contact validation, the contact form
/// submission lifecycle, and the wire types spoken between the page and
/// the mail relay.

pub mod contact;
pub mod frame;
pub mod submission;
pub mod tilt;
pub mod transform;
pub mod wire;

// Re-export commonly used types
pub use contact::{ContactError, ContactFields, ContactMessage, Field};
pub use frame::FrameSlot;
pub use submission::{
    ContactForm, ContactTransport, DeliveryError, FormConfig, Notice, ResetTicket, Submission,
    SubmissionState, SubmitOutcome, SubmitRejected,
};
pub use tilt::{
    ElementBounds, MoveOutcome, PointerSample, TiltConfig, TiltEngine, TiltStyle, TransformSyntax,
};
pub use transform::{TiltTransform, Transform};
pub use wire::{RelayReply, CONTACT_PATH};
