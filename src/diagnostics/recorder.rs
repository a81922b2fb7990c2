use std::cell::RefCell;

use super::model::Attachment;

thread_local! {
    static BUFFER: RefCell<Vec<Attachment>> = const { RefCell::new(Vec::new()) };
}

/// Attach an artefact to the scenario running on this thread.
pub fn attach(name: &str, mime: &str, content: impl Into<String>) {
    let attachment = Attachment::new(name, mime, content);
    BUFFER.with(|buffer| buffer.borrow_mut().push(attachment));
}

/// Drain everything attached on this thread so far.
pub fn take() -> Vec<Attachment> {
    BUFFER.with(|buffer| std::mem::take(&mut *buffer.borrow_mut()))
}

/// Drop pending attachments without returning them.
pub fn discard() {
    BUFFER.with(|buffer| buffer.borrow_mut().clear());
}

pub fn pending() -> usize {
    BUFFER.with(|buffer| buffer.borrow().len())
}
