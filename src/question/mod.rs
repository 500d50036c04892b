//! Question drafts and the records of the question bank API

mod draft;
mod model;

pub use draft::{QuestionDraft, SubjectCatalog};
pub use model::{option_label, Question, QuestionSubmission, User};
