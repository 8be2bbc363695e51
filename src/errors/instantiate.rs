use alloc::boxed::Box;

use super::dependency_resolver::ResolveErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Argument at position {position} is missing")]
    MissingArgument { position: usize },
    #[error("Incorrect argument type at position {position}. Actual: {actual}, expected: {expected}")]
    IncorrectType {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Method called without a receiver")]
    MissingReceiver,
    #[error("Incorrect receiver type. Actual: {actual}, expected: {expected}")]
    IncorrectReceiver { expected: &'static str, actual: &'static str },
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}
