//! Custom actions for the Repository actor.

/// Operations on a repository's contents.
#[derive(Debug, Clone)]
pub enum RepositoryAction {
    /// Pushes an image under `tag`, replacing any image already carrying it.
    PushImage { tag: String },
    ListImages,
}

/// Results from RepositoryActions - variants match 1:1 with RepositoryAction
#[derive(Debug, Clone)]
pub enum RepositoryActionResult {
    PushImage(super::Image),
    ListImages(Vec<super::Image>),
}
