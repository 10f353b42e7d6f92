pub mod assembler;
pub mod email;
pub mod render;

pub use assembler::DigestAssembler;
pub use email::EmailSender;
pub use render::{render_console, render_html, render_text};
