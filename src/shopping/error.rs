use thiserror::Error;

/// A selection the engine refuses to scale: servings must be a finite, positive number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("selection {name:?} has invalid servings={servings} (must be a positive number)")]
    InvalidServings { name: String, servings: f64 },
}
