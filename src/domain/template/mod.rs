//! Email templates and the `{{variable}}` rendering pipeline.
//!
//! A template's content is free text carrying `{{identifier}}`
//! placeholders. Rendering is a pure text operation (`render`); the
//! batch preview engine (`preview`) drives it across many contacts,
//! merging contact fields with the configured sender profile.

mod preview;
mod render;
mod service;
mod types;

pub use preview::{batch_preview, contact_variables, PreviewSource};
pub use render::{render_content, Rendered};
pub use service::TemplateService;
pub use types::{
    BatchPreviewRequest, BatchPreviewResponse, ContactPreview, CreateTemplateRequest,
    EmailTemplate, RenderResponse, TemplateListResponse, TemplateResponse,
    TemplateVariablesResponse, UpdateTemplateRequest,
};
